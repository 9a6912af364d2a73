use anyhow::Result;
use clap::Parser;

use sanyuan_toolbox::ToolError;
use sanyuan_toolbox::cli::{RmbUpperArgs, ToolArgs, UnitConvertArgs};

#[tokio::test]
async fn unit_conversion_line() -> Result<()> {
    let args = UnitConvertArgs::try_parse_from(["unit-convert", "3", "尺", "cm", "-d", "2"])?;
    let report = args.execute().await?;
    assert_eq!(report.summary, "3.0 尺 [尺] = 99.99 cm [cm]");

    let args = UnitConvertArgs::try_parse_from(["unit-convert", "1", "海里(nmi)", "m"])?;
    assert_eq!(args.execute().await?.summary, "1.0 nmi [nmi] = 1852.000000 m [m]");
    Ok(())
}

#[tokio::test]
async fn unit_listing_and_errors() -> Result<()> {
    let args = UnitConvertArgs::try_parse_from(["unit-convert", "--list"])?;
    let report = args.execute().await?;
    assert_eq!(report.summary, "32 units");
    assert!(report.text.unwrap_or_default().starts_with("公制单位: m, km"));

    let unknown = UnitConvertArgs::try_parse_from(["unit-convert", "1", "m", "league"])?;
    assert!(matches!(unknown.execute().await, Err(ToolError::UnknownUnit(u)) if u == "league"));

    let negative = UnitConvertArgs::try_parse_from(["unit-convert", "1", "m", "km", "-d", "-2"])?;
    assert!(negative.execute().await.is_err());
    Ok(())
}

#[tokio::test]
async fn currency_text() -> Result<()> {
    for (amount, expected) in [
        ("1234.56", "壹仟贰佰叁拾肆元伍角陆分"),
        ("100000001", "壹亿零壹元整"),
        ("0.05", "零元伍分"),
    ] {
        let args = RmbUpperArgs::try_parse_from(["rmb-upper", amount])?;
        assert_eq!(args.execute().await?.summary, expected, "{amount}");
    }

    let bad = RmbUpperArgs::try_parse_from(["rmb-upper", "12.345678901"])?;
    assert!(matches!(bad.execute().await, Err(ToolError::InvalidAmount { .. })));
    Ok(())
}
