pub trait PlaceholderFunction: Send + Sync {
    fn namespace(&self) -> &str;
    fn name(&self) -> &str;

    fn full_name(&self) -> String {
        format!("{}.{}", self.namespace(), self.name())
    }

    fn validate_args(&self, _args: &[String]) -> Result<(), String> {
        Ok(())
    }

    fn execute(&self, args: &[String]) -> Result<String, String>;
}
