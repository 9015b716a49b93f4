//! Output template rendering.
//!
//! Templates carry `%(name)` or `${name}` placeholders. A placeholder the
//! lookup does not know renders as an empty string; an unterminated one is
//! kept literally.

/// Render `template`, resolving placeholders through `lookup`.
pub fn render<F>(template: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(['%', '$']) {
        let (open, close) = match rest[start..].as_bytes().get(1) {
            Some(b'(') if rest.as_bytes()[start] == b'%' => ("%(", ')'),
            Some(b'{') if rest.as_bytes()[start] == b'$' => ("${", '}'),
            _ => {
                out.push_str(&rest[..=start]);
                rest = &rest[start + 1..];
                continue;
            }
        };

        let body = &rest[start + open.len()..];
        match body.find(close) {
            Some(end) => {
                out.push_str(&rest[..start]);
                let name = body[..end].trim();
                if let Some(value) = lookup(name) {
                    out.push_str(&value);
                }
                rest = &body[end + 1..];
            }
            None => {
                out.push_str(rest);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Placeholder names referenced by `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    render(template, |name| {
        names.push(name.to_string());
        None
    });
    names
}
