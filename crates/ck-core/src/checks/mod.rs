//! Built-in checks.

pub mod dummy;
pub mod memory;
pub mod uptime;

pub use dummy::CheckDummy;
pub use memory::CheckMemory;
pub use uptime::CheckUptime;

use crate::check::{Check, RegistryBuilder};
use ck_common::Result;

/// Register every built-in check with its aliases.
pub fn register_builtin(builder: &mut RegistryBuilder) -> Result<()> {
    builder
        .register("check_dummy", &[], || Box::new(CheckDummy) as Box<dyn Check>)?
        .register("check_uptime", &["CheckUpTime"], || {
            Box::new(CheckUptime) as Box<dyn Check>
        })?
        .register("check_memory", &["CheckMEM"], || {
            Box::new(CheckMemory) as Box<dyn Check>
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::check::Registry;

    #[test]
    fn builtin_names_and_aliases() {
        let registry = Registry::builtin().unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.canonical_name("CheckUpTime").unwrap(), "check_uptime");
        assert_eq!(registry.canonical_name("checkmem").unwrap(), "check_memory");
        assert_eq!(
            registry.describe("CheckMEM").unwrap(),
            registry.describe("check_memory").unwrap()
        );
    }
}
