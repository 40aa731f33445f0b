use kryon_ir::{StringTable, Unit, Value};

pub fn quote(s: &str) -> String {
    format!("{s:?}")
}

pub fn unit_suffix(unit: Unit) -> &'static str {
    match unit {
        Unit::Px => "px",
        Unit::Pct => "%",
        Unit::Em => "em",
        Unit::Rem => "rem",
        Unit::Vw => "vw",
        Unit::Vh => "vh",
        Unit::Vmin => "vmin",
        Unit::Vmax => "vmax",
        Unit::None => "",
    }
}

fn float_literal(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

/// Renders a resolved [`Value`] back into source-text literal form.
pub fn render_value(strings: &StringTable, value: &Value) -> String {
    match value {
        Value::String(idx) => quote(strings.get(*idx).unwrap_or("")),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => float_literal(*f),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Color(r, g, b, 255) => format!("#{r:02X}{g:02X}{b:02X}"),
        Value::Color(r, g, b, a) => format!("#{r:02X}{g:02X}{b:02X}{a:02X}"),
        Value::Unit(v, unit) => format!("{}{}", float_literal(*v), unit_suffix(*unit)),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(|v| render_value(strings, v)).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(fields) => {
            let parts: Vec<String> =
                fields.iter().map(|(k, v)| format!("{}: {}", strings.get(*k).unwrap_or(""), render_value(strings, v))).collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}
