use super::super::traits::PlaceholderFunction;
use rand::Rng;

/// `random.int()` gives 0..=1000, `random.int(min, max)` an inclusive range.
pub struct RandomInt;

const DEFAULT_MAX: i64 = 1000;

impl RandomInt {
    fn bounds(args: &[String]) -> Result<(i64, i64), String> {
        match args {
            [] => Ok((0, DEFAULT_MAX)),
            [min, max] => {
                let min = min
                    .parse::<i64>()
                    .map_err(|_| format!("random.int min '{min}' is not an integer"))?;
                let max = max
                    .parse::<i64>()
                    .map_err(|_| format!("random.int max '{max}' is not an integer"))?;
                if min > max {
                    return Err(format!("random.int min {min} is greater than max {max}"));
                }
                Ok((min, max))
            }
            _ => Err("random.int takes no arguments or (min, max)".to_string()),
        }
    }
}

impl PlaceholderFunction for RandomInt {
    fn namespace(&self) -> &str {
        "random"
    }

    fn name(&self) -> &str {
        "int"
    }

    fn validate_args(&self, args: &[String]) -> Result<(), String> {
        Self::bounds(args).map(|_| ())
    }

    fn execute(&self, args: &[String]) -> Result<String, String> {
        let (min, max) = Self::bounds(args)?;
        Ok(rand::rng().random_range(min..=max).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_int_in_range() {
        let args = vec!["5".to_string(), "7".to_string()];
        for _ in 0..20 {
            let value: i64 = RandomInt.execute(&args).unwrap().parse().unwrap();
            assert!((5..=7).contains(&value));
        }
    }

    #[test]
    fn test_random_int_rejects_inverted_range() {
        let args = vec!["9".to_string(), "1".to_string()];
        assert!(RandomInt.validate_args(&args).is_err());
    }
}
