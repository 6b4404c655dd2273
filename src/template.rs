//! Template adapter: the device-to-text conversions page generation relies on.
//!
//! The [`TemplateAdapter`] trait defines the three operations the site
//! assembler needs from a device template dialect: a human-readable pin
//! description, a canonical page identifier, and a sanitized identifier.
//!
//! The production implementation is [`OpenBekenTemplate`], which reads
//! OpenBeken-style pin assignments (`"<pin>": "<Role>;<channel>[;<channel>]"`).

use crate::catalog::Device;
use crate::naming;
use serde_json::Value;

/// Trait for device template dialects.
///
/// Implementations must be deterministic: the same record always yields the
/// same identifier, since peers link to each other by it.
pub trait TemplateAdapter: Sync {
    /// Multi-line description of the device's pin/feature configuration.
    /// Lines are separated by `\n`.
    fn describe(&self, device: &Device) -> String;

    /// Canonical, pre-sanitization page name for the device.
    fn page_identifier(&self, device: &Device) -> String;

    /// Filesystem- and URL-safe token for an identifier.
    fn sanitize(&self, identifier: &str) -> String;

    /// Sanitized page identifier, the stem of the device's page file.
    fn page_token(&self, device: &Device) -> String {
        self.sanitize(&self.page_identifier(device))
    }
}

/// OpenBeken template dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenBekenTemplate;

impl TemplateAdapter for OpenBekenTemplate {
    fn describe(&self, device: &Device) -> String {
        let mut lines = Vec::new();
        if let Some(pins) = device.pins() {
            for (pin, assignment) in pins {
                if let Some(line) = describe_pin(pin, assignment) {
                    lines.push(line);
                }
            }
        }
        if let Some(command) = device.text("command") {
            lines.push(format!("Device-specific startup command: {command}"));
        }
        lines.join("\n")
    }

    fn page_identifier(&self, device: &Device) -> String {
        naming::page_name_for_device(device)
    }

    fn sanitize(&self, identifier: &str) -> String {
        naming::sanitize_filename(identifier)
    }
}

/// One description line for a pin assignment, `None` for unassigned pins.
///
/// ```text
/// "6": "Rel;1"      → "- Relay (channel 1) on P6"
/// "8": "LED_n;2;3"  → "- LED (inverted) (channels 2, 3) on P8"
/// "26": "ADC"       → "- ADC on P26"
/// ```
fn describe_pin(pin: &str, assignment: &Value) -> Option<String> {
    let raw = match assignment {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let mut parts = raw.split(';').map(str::trim);
    let role = parts.next().unwrap_or_default();
    let channels: Vec<&str> = parts.filter(|c| !c.is_empty()).collect();

    let location = if pin.parse::<u32>().is_ok() {
        format!("P{pin}")
    } else {
        pin.to_string()
    };

    let channel_note = match channels.as_slice() {
        [] => String::new(),
        [one] => format!(" (channel {one})"),
        many => format!(" (channels {})", many.join(", ")),
    };

    Some(format!("- {}{} on {}", role_label(role), channel_note, location))
}

/// Human-readable name for an OpenBeken pin role. Unknown roles pass through.
fn role_label(role: &str) -> String {
    let (base, inverted) = match role.strip_suffix("_n") {
        Some(base) => (base, true),
        None => (role, false),
    };
    let label = match base {
        "Rel" => "Relay",
        "Btn" => "Button",
        "Btn_2x" | "Btn_ScriptOnly" => "Button (script)",
        "LED" => "LED",
        "WifiLED" => "WiFi LED",
        "PWM" => "PWM",
        "DigitalInput" | "dInput" => "Digital input",
        "TglChanOnTgl" => "Toggle channel on toggle",
        "ADC" => "ADC",
        "IRRecv" => "IR receiver",
        "IRSend" => "IR transmitter",
        "DHT11" | "DHT12" | "DHT21" | "DHT22" => "DHT sensor",
        "BL0937SEL" => "BL0937 SEL",
        "BL0937CF" => "BL0937 CF",
        "BL0937CF1" => "BL0937 CF1",
        "SM2135DAT" | "SM2235DAT" | "BP5758D_DAT" | "BP1658CJ_DAT" => "LED driver data",
        "SM2135CLK" | "SM2235CLK" | "BP5758D_CLK" | "BP1658CJ_CLK" => "LED driver clock",
        _ => return role.to_string(),
    };
    if inverted {
        format!("{label} (inverted)")
    } else {
        label.to_string()
    }
}
