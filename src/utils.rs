#[macro_export]
macro_rules! getter_fn {
    ($field_name: ident, $field_type: ty) => {
        pub fn $field_name(&self) -> &$field_type {
            &self.$field_name
        }
    };
}
pub use getter_fn;

#[macro_export]
macro_rules! with_field_fn {
    ($field_name: ident, $field_type: ty) => {
        paste::paste! {
            pub fn [<with_$field_name>](mut self, value: $field_type) -> Self {
                self.$field_name = value;
                self
            }
        }
    };
}
pub use with_field_fn;

/// Formats a duration as fractional hours, used in log messages about
/// batch boundaries.
pub fn fmt_hours(duration: chrono::TimeDelta) -> String {
    format!("{:.2}", duration.num_seconds() as f64 / 3600.0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn test_fmt_hours() {
        assert_eq!(fmt_hours(TimeDelta::minutes(90)), "1.50");
        assert_eq!(fmt_hours(TimeDelta::zero()), "0.00");
    }
}
