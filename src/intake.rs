//! Profile intake form
//!
//! Line-oriented prompts over any reader/writer pair, so the form is
//! testable with in-memory buffers. Invalid input re-prompts; the form
//! never lets an out-of-range value through. Never touches the network.

use std::io::{BufRead, Write};

use crate::error::AdvisorError;
use crate::models::{RiskTolerance, UserProfile};
use crate::Result;

pub const MIN_AGE: u8 = 18;
pub const MAX_AGE: u8 = 100;

/// Field-level rules, shared with the HTTP API's request validation.
pub fn validate_profile(profile: &UserProfile) -> Result<()> {
    if profile.name.trim().is_empty() {
        return Err(AdvisorError::InvalidProfile(
            "name must not be empty".to_string(),
        ));
    }
    if !(MIN_AGE..=MAX_AGE).contains(&profile.age) {
        return Err(AdvisorError::InvalidProfile(format!(
            "age must be between {} and {}",
            MIN_AGE, MAX_AGE
        )));
    }
    if profile.occupation.trim().is_empty() {
        return Err(AdvisorError::InvalidProfile(
            "occupation must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn parse_age(input: &str) -> Option<u8> {
    let age: u8 = input.trim().parse().ok()?;
    (MIN_AGE..=MAX_AGE).contains(&age).then_some(age)
}

pub fn parse_income(input: &str) -> Option<u64> {
    // Allow "50,000"-style separators.
    input.trim().replace(',', "").parse().ok()
}

/// Blank means the default; anything else must parse.
pub fn parse_risk_choice(input: &str) -> Option<RiskTolerance> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(RiskTolerance::default());
    }
    RiskTolerance::parse(trimmed)
}

/// Run the form. Returns Ok(None) when the input stream ends before the
/// profile is complete.
pub fn read_profile<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> std::io::Result<Option<UserProfile>> {
    let Some(name) = prompt_until(input, output, "Full name: ", |line| {
        let name = line.trim();
        (!name.is_empty()).then(|| name.to_string())
    })?
    else {
        return Ok(None);
    };

    let Some(age) = prompt_until(
        input,
        output,
        &format!("Age ({}-{}): ", MIN_AGE, MAX_AGE),
        parse_age,
    )?
    else {
        return Ok(None);
    };

    let Some(occupation) = prompt_until(input, output, "Occupation: ", |line| {
        let occupation = line.trim();
        (!occupation.is_empty()).then(|| occupation.to_string())
    })?
    else {
        return Ok(None);
    };

    let Some(monthly_income) =
        prompt_until(input, output, "Monthly income (₹): ", parse_income)?
    else {
        return Ok(None);
    };

    let Some(risk_tolerance) = prompt_until(
        input,
        output,
        "Risk appetite [Low/Medium/High] (default Medium): ",
        parse_risk_choice,
    )?
    else {
        return Ok(None);
    };

    Ok(Some(UserProfile {
        name,
        age,
        occupation,
        monthly_income,
        risk_tolerance,
    }))
}

/// Prompt, read a line, parse; repeat until the parser accepts or the
/// stream ends.
fn prompt_until<R, W, T>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> std::io::Result<Option<T>>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "{}", prompt)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match parse(&line) {
            Some(value) => return Ok(Some(value)),
            None => writeln!(output, "Please enter a valid value.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_form(lines: &str) -> Option<UserProfile> {
        let mut input = Cursor::new(lines.to_string());
        let mut output = Vec::new();
        read_profile(&mut input, &mut output).unwrap()
    }

    #[test]
    fn collects_a_complete_profile() {
        let profile = run_form("Asha\n31\nSoftware Engineer\n150000\nHigh\n").unwrap();
        assert_eq!(profile.name, "Asha");
        assert_eq!(profile.age, 31);
        assert_eq!(profile.monthly_income, 150_000);
        assert_eq!(profile.risk_tolerance, RiskTolerance::High);
    }

    #[test]
    fn blank_risk_choice_defaults_to_medium() {
        let profile = run_form("Ravi\n45\nTeacher\n60000\n\n").unwrap();
        assert_eq!(profile.risk_tolerance, RiskTolerance::Medium);
    }

    #[test]
    fn out_of_range_age_reprompts_instead_of_passing_through() {
        // 17 and 101 are rejected; 35 is the first accepted answer.
        let profile = run_form("Asha\n17\n101\n35\nDoctor\n80000\nLow\n").unwrap();
        assert_eq!(profile.age, 35);
    }

    #[test]
    fn blank_name_reprompts() {
        let profile = run_form("\n  \nAsha\n30\nDoctor\n80000\nLow\n").unwrap();
        assert_eq!(profile.name, "Asha");
    }

    #[test]
    fn income_accepts_separators_and_rejects_negatives() {
        assert_eq!(parse_income("1,50,000"), Some(150_000));
        assert_eq!(parse_income("-500"), None);
        assert_eq!(parse_income("abc"), None);
    }

    #[test]
    fn exhausted_input_yields_none() {
        assert!(run_form("Asha\n31\n").is_none());
    }

    #[test]
    fn validate_profile_enforces_field_rules() {
        let good = UserProfile {
            name: "Asha".to_string(),
            age: 31,
            occupation: "Engineer".to_string(),
            monthly_income: 0,
            risk_tolerance: RiskTolerance::Medium,
        };
        assert!(validate_profile(&good).is_ok());

        let mut bad = good.clone();
        bad.age = 17;
        assert!(validate_profile(&bad).is_err());

        let mut bad = good.clone();
        bad.name = "  ".to_string();
        assert!(validate_profile(&bad).is_err());

        let mut bad = good;
        bad.occupation = String::new();
        assert!(validate_profile(&bad).is_err());
    }
}
