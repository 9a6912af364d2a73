//! Length unit conversion.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitCategory {
    Metric,
    Imperial,
    ChineseTraditional,
    Astronomical,
    Nautical,
}

impl UnitCategory {
    pub const ALL: [UnitCategory; 5] = [
        UnitCategory::Metric,
        UnitCategory::Imperial,
        UnitCategory::ChineseTraditional,
        UnitCategory::Astronomical,
        UnitCategory::Nautical,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            UnitCategory::Metric => "公制单位",
            UnitCategory::Imperial => "英制单位",
            UnitCategory::ChineseTraditional => "中国传统单位",
            UnitCategory::Astronomical => "天文单位",
            UnitCategory::Nautical => "航海单位",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Unit {
    pub symbol: &'static str,
    /// Length of one unit in meters
    pub meters: f64,
    pub category: UnitCategory,
    /// Friendly name shown next to terse symbols
    pub display_name: Option<&'static str>,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_name {
            Some(name) => write!(f, "{}({})", name, self.symbol),
            None => f.write_str(self.symbol),
        }
    }
}

const fn unit(symbol: &'static str, meters: f64, category: UnitCategory) -> Unit {
    Unit {
        symbol,
        meters,
        category,
        display_name: None,
    }
}

const fn named(symbol: &'static str, meters: f64, category: UnitCategory, name: &'static str) -> Unit {
    Unit {
        symbol,
        meters,
        category,
        display_name: Some(name),
    }
}

use UnitCategory::*;

pub const UNITS: &[Unit] = &[
    unit("m", 1.0, Metric),
    unit("km", 1000.0, Metric),
    unit("dm", 0.1, Metric),
    unit("cm", 0.01, Metric),
    unit("mm", 0.001, Metric),
    unit("μm", 1e-6, Metric),
    unit("nm", 1e-9, Metric),
    unit("pm", 1e-12, Metric),
    unit("fm", 1e-15, Metric),
    unit("inch", 0.0254, Imperial),
    unit("foot", 0.3048, Imperial),
    unit("yard", 0.9144, Imperial),
    unit("fath", 1.8288, Imperial),
    unit("furlong", 201.168, Imperial),
    unit("mile", 1609.344, Imperial),
    unit("里", 500.0, ChineseTraditional),
    unit("丈", 3.3333, ChineseTraditional),
    unit("尺", 0.3333, ChineseTraditional),
    unit("寸", 0.0333, ChineseTraditional),
    unit("分", 0.0033, ChineseTraditional),
    unit("厘", 0.0003, ChineseTraditional),
    unit("毫", 0.00003, ChineseTraditional),
    unit("寻", 1.6, ChineseTraditional),
    unit("仞", 1.8, ChineseTraditional),
    unit("步", 1.5, ChineseTraditional),
    unit("常", 2.4, ChineseTraditional),
    unit("跬", 0.8, ChineseTraditional),
    named("AU", 149_597_870_700.0, Astronomical, "天文单位"),
    named("ly", 9_460_730_472_580_800.0, Astronomical, "光年"),
    named("pc", 30_856_775_814_913_672.8, Astronomical, "秒差距"),
    named("nmi", 1852.0, Nautical, "海里"),
    named("cable", 185.2, Nautical, "链"),
];

/// Find a unit by symbol (`km`), display name (`光年`) or the combined
/// `name(symbol)` form used in listings. `um` is accepted for `μm`.
pub fn lookup(name: &str) -> Result<&'static Unit> {
    let trimmed = name.trim();
    let symbol = match trimmed.rsplit_once('(') {
        Some((_, rest)) if rest.ends_with(')') => &rest[..rest.len() - 1],
        _ => trimmed,
    };
    let symbol = if symbol == "um" { "μm" } else { symbol };
    UNITS
        .iter()
        .find(|u| u.symbol == symbol || u.display_name == Some(symbol))
        .ok_or_else(|| ToolError::UnknownUnit(name.to_string()))
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(300) as i32);
    let rounded = (value * factor).round() / factor;
    // Very large values overflow the scaled form; they need no rounding.
    if rounded.is_finite() { rounded } else { value }
}

/// Convert `value` between two units, rounded to `decimals` places.
pub fn convert(value: f64, from: &str, to: &str, decimals: i32) -> Result<f64> {
    if !value.is_finite() {
        return Err(ToolError::InvalidInput(format!("'{value}' is not a finite number")));
    }
    if decimals < 0 {
        return Err(ToolError::InvalidInput("decimal places cannot be negative".to_string()));
    }
    let from = lookup(from)?;
    let to = lookup(to)?;
    Ok(round_to(value * from.meters / to.meters, decimals as u32))
}

/// Shortest round-trip text of `value` that always carries a fractional
/// part or an exponent: `1.0`, `2.5`, `1e+16`, `1e-05`.
pub fn display_value(value: f64) -> String {
    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

/// One result line, e.g. `1.0 km [km] = 1000.000000 m [m]`.
pub fn format_conversion(value: f64, from: &str, to: &str, decimals: i32) -> Result<String> {
    let result = convert(value, from, to, decimals)?;
    let from = lookup(from)?.symbol;
    let to = lookup(to)?.symbol;
    Ok(format!(
        "{} {from} [{from}] = {result:.prec$} {to} [{to}]",
        display_value(value),
        prec = decimals as usize
    ))
}

/// Every unit grouped by category, one category per line.
pub fn unit_listing() -> String {
    UnitCategory::ALL
        .iter()
        .map(|category| {
            let members: Vec<String> = UNITS
                .iter()
                .filter(|u| u.category == *category)
                .map(Unit::to_string)
                .collect();
            format!("{}: {}", category.display_name(), members.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_systems() {
        assert_eq!(convert(1.0, "km", "m", 6).unwrap(), 1000.0);
        assert_eq!(convert(1.0, "mile", "km", 3).unwrap(), 1.609);
        assert_eq!(convert(2.0, "里", "m", 0).unwrap(), 1000.0);
        assert_eq!(convert(1.0, "nmi", "cable", 2).unwrap(), 10.0);
    }

    #[test]
    fn formats_result_line() {
        assert_eq!(
            format_conversion(1.0, "km", "m", 6).unwrap(),
            "1.0 km [km] = 1000.000000 m [m]"
        );
        assert_eq!(
            format_conversion(1.5, "光年", "AU", 1).unwrap(),
            "1.5 ly [ly] = 94861.6 AU [AU]"
        );
        assert_eq!(
            format_conversion(-3.0, "m", "cm", 0).unwrap(),
            "-3.0 m [m] = -300 cm [cm]"
        );
    }

    #[test]
    fn whole_values_keep_a_fraction() {
        assert_eq!(display_value(1.0), "1.0");
        assert_eq!(display_value(0.25), "0.25");
        assert_eq!(display_value(1e16), "1e+16");
        assert_eq!(display_value(1e-5), "1e-05");
    }

    #[test]
    fn accepts_display_forms() {
        assert_eq!(lookup("秒差距(pc)").unwrap().symbol, "pc");
        assert_eq!(lookup("um").unwrap().symbol, "μm");
        assert!(matches!(lookup("parsec"), Err(ToolError::UnknownUnit(_))));
    }

    #[test]
    fn rejects_bad_options() {
        assert!(convert(1.0, "m", "km", -1).is_err());
        assert!(convert(f64::NAN, "m", "km", 2).is_err());
        assert!(convert(1.0, "m", "furlongs", 2).is_err());
    }

    #[test]
    fn listing_has_every_category() {
        let listing = unit_listing();
        assert_eq!(listing.lines().count(), 5);
        assert!(listing.contains("航海单位: 海里(nmi), 链(cable)"));
    }
}
