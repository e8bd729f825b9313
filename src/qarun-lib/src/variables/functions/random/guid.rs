use super::super::traits::PlaceholderFunction;
use uuid::Uuid;

pub struct RandomGuid;

impl PlaceholderFunction for RandomGuid {
    fn namespace(&self) -> &str {
        "random"
    }

    fn name(&self) -> &str {
        "guid"
    }

    fn validate_args(&self, args: &[String]) -> Result<(), String> {
        if !args.is_empty() {
            return Err("random.guid takes no arguments".to_string());
        }
        Ok(())
    }

    fn execute(&self, _args: &[String]) -> Result<String, String> {
        Ok(Uuid::new_v4().to_string())
    }
}
