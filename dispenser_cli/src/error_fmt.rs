//! Human-readable error descriptions and structured JSON error formatting.

use dispenser_core::DispenserError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(de) = err.downcast_ref::<DispenserError>() {
        return match de {
            DispenserError::Timeout => "What happened: The alarm line did not answer in time.\nLikely causes: ADC not powered, SPI disabled, or wrong bus/slave select.\nHow to fix: Enable SPI, check 3V3/GND to the MCP3008 and the [pins] spi_* values.".to_string(),
            DispenserError::HardwareFault(msg) => format!(
                "What happened: The hardware driver reported a fault ({msg}).\nLikely causes: Wrong pin or channel numbers, or the device was unplugged mid-attempt.\nHow to fix: Check [pins] in the config and the wiring, then run `dispenser self-check`."
            ),
            DispenserError::Hardware(msg) => format!(
                "What happened: A hardware call failed ({msg}).\nLikely causes: Relay or alarm line unavailable during the attempt.\nHow to fix: Run `dispenser self-check`; re-run with --log-level=debug for the failing phase."
            ),
            DispenserError::Console(msg) => format!(
                "What happened: The command console failed ({msg}).\nLikely causes: stdout closed or stdin unreadable.\nHow to fix: Keep the terminal or pipe open for the lifetime of `dispenser run`."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.starts_with("read config") {
        return format!(
            "What happened: Could not read the config file ({msg}).\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config with an existing TOML file (see etc/dispenser.toml)."
        );
    }

    if lower.starts_with("parse config") {
        return format!(
            "What happened: The config file is not valid TOML for this tool ({msg}).\nLikely causes: Typo in a key, wrong value type, or unknown table.\nHow to fix: Compare against etc/dispenser.toml and fix the reported line."
        );
    }

    if lower.starts_with("pins.") || lower.starts_with("simulation.") || lower.starts_with("logging.")
    {
        return format!(
            "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range value in the TOML.\nHow to fix: Edit the config file, then rerun."
        );
    }

    if lower.contains("open relay pin") || lower.contains("open alarm adc") {
        return "What happened: Failed to initialize hardware.\nLikely causes: Incorrect pin numbers, SPI not enabled, or insufficient GPIO/SPI permissions.\nHow to fix: Fix the [pins] values; add the user to the gpio and spi groups.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 hardware, 4 timeout, 5 console, 1 anything else.
/// (6 is reserved for a completed attempt with a Failure verdict.)
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<DispenserError>() {
        Some(DispenserError::Hardware(_) | DispenserError::HardwareFault(_)) => 3,
        Some(DispenserError::Timeout) => 4,
        Some(DispenserError::Console(_)) => 5,
        None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<DispenserError>() {
        Some(DispenserError::Hardware(_)) => "Hardware",
        Some(DispenserError::HardwareFault(_)) => "HardwareFault",
        Some(DispenserError::Timeout) => "Timeout",
        Some(DispenserError::Console(_)) => "Console",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "error": format!("{err:#}"),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;
    use rstest::rstest;

    #[rstest]
    #[case(DispenserError::Hardware("gpio".into()), 3)]
    #[case(DispenserError::HardwareFault("spi".into()), 3)]
    #[case(DispenserError::Timeout, 4)]
    #[case(DispenserError::Console("stdout".into()), 5)]
    fn exit_codes_follow_error_kind(#[case] e: DispenserError, #[case] code: i32) {
        let report = Err::<(), _>(e).wrap_err("sample alarm window").unwrap_err();
        assert_eq!(exit_code_for_error(&report), code);
    }

    #[test]
    fn untyped_errors_exit_one() {
        assert_eq!(exit_code_for_error(&eyre::eyre!("boom")), 1);
    }

    #[test]
    fn config_range_errors_are_explained() {
        let text = humanize(&eyre::eyre!("pins.alarm_channel must be in 0..=7"));
        assert!(text.starts_with("What happened: Invalid configuration"));
    }

    #[test]
    fn json_error_names_the_reason() {
        let v: serde_json::Value =
            serde_json::from_str(&format_error_json(&eyre::Report::new(DispenserError::Timeout)))
                .unwrap();
        assert_eq!(v["reason"], "Timeout");
        assert!(v["message"].as_str().unwrap().contains("alarm line"));
    }
}
