//! Current date/time tool

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use crate::tools::{ParameterProperty, ParameterSchema, Tool, ToolContext, ToolResult};

/// Reports the current time, optionally in an IANA timezone
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "get_current_time"
    }

    fn description(&self) -> &str {
        "Get the current date and time. Optionally pass an IANA timezone such as 'America/New_York' or 'Asia/Tokyo'."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new().with_property(
            "timezone",
            ParameterProperty::string("IANA timezone name (default: UTC)"),
        )
    }

    async fn execute(&self, args: &Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let timezone = args.get("timezone").and_then(|v| v.as_str());
        Ok(ToolResult::success(format_current_time(timezone, Utc::now())))
    }
}

fn utc_string(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Render `now` for the requested zone. Unknown zones fall back to UTC.
pub fn format_current_time(timezone: Option<&str>, now: DateTime<Utc>) -> String {
    let timezone = timezone.map(str::trim).filter(|tz| !tz.is_empty());

    let Some(name) = timezone else {
        return format!("Current time (UTC): {}", utc_string(now));
    };

    match name.parse::<Tz>() {
        Ok(tz) => {
            let local = now.with_timezone(&tz);
            format!(
                "Current time in {}: {}",
                name,
                local.format("%A, %B %-d, %Y at %-I:%M:%S %p %Z")
            )
        }
        Err(_) => format!("Invalid timezone: {}. Using UTC: {}", name, utc_string(now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 45).unwrap()
    }

    #[test]
    fn test_no_timezone_is_utc() {
        assert_eq!(
            format_current_time(None, fixed_now()),
            "Current time (UTC): Fri, 15 Mar 2024 12:30:45 GMT"
        );
        assert_eq!(
            format_current_time(Some("  "), fixed_now()),
            "Current time (UTC): Fri, 15 Mar 2024 12:30:45 GMT"
        );
    }

    #[test]
    fn test_named_timezone() {
        assert_eq!(
            format_current_time(Some("Asia/Tokyo"), fixed_now()),
            "Current time in Asia/Tokyo: Friday, March 15, 2024 at 9:30:45 PM JST"
        );
    }

    #[test]
    fn test_invalid_timezone_falls_back() {
        assert_eq!(
            format_current_time(Some("Atlantis"), fixed_now()),
            "Invalid timezone: Atlantis. Using UTC: Fri, 15 Mar 2024 12:30:45 GMT"
        );
    }

    #[tokio::test]
    async fn test_execute_without_args() {
        let result = CurrentTimeTool
            .execute(&Value::Null, &ToolContext::default())
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.starts_with("Current time (UTC): "));

        let result = CurrentTimeTool
            .execute(&json!({"timezone": "Atlantis"}), &ToolContext::default())
            .await
            .unwrap();
        assert!(result.output.starts_with("Invalid timezone: Atlantis. Using UTC: "));
    }
}
