use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating code fields (service code, counter code).
    /// Must be uppercase alphanumeric, optionally hyphen-separated; codes
    /// double as ticket prefixes on printed stubs.
    /// - Valid: "PAY", "CW", "REG-2"
    /// - Invalid: "pay", "-PAY", "PAY-", "PAY--2", "PAY_2"
    pub static ref CODE_REGEX: Regex = Regex::new(r"^[A-Z0-9]+(?:-[A-Z0-9]+)*$").unwrap();
}
