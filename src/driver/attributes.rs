use super::Lakeshore335;
use super::types::HeaterRange;
use crate::error::{LakeshoreError, Result};

/// Parse a numeric reply such as `"299.98\r\n"`
pub fn parse_float_reply(reply: &str) -> Result<f64> {
    let text = reply.trim();
    text.parse::<f64>().map_err(|_| {
        LakeshoreError::protocol(format!("Expected a number, instrument replied '{}'", text))
    })
}

/// Parse an integer reply such as `"2\r\n"`. A leading `+` is accepted.
pub fn parse_int_reply(reply: &str) -> Result<i64> {
    let text = reply.trim();
    text.parse::<i64>().map_err(|_| {
        LakeshoreError::protocol(format!("Expected an integer, instrument replied '{}'", text))
    })
}

fn check_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LakeshoreError::validation(
            field.to_string(),
            format!("{} is not a finite number", value),
        ))
    }
}

impl Lakeshore335 {
    /// Input A temperature in kelvin
    pub async fn read_input_a(&mut self) -> Result<f64> {
        let reply = self.query("KRDG?A".to_string()).await?;
        parse_float_reply(&reply)
    }

    /// Input B temperature in kelvin
    pub async fn read_input_b(&mut self) -> Result<f64> {
        let reply = self.query("KRDG?B".to_string()).await?;
        parse_float_reply(&reply)
    }

    /// Configured output index. No exchange is made.
    pub fn read_output(&self) -> u8 {
        self.config.output
    }

    pub async fn read_setpoint(&mut self) -> Result<f64> {
        let reply = self.query(format!("SETP? {}", self.output())).await?;
        parse_float_reply(&reply)
    }

    pub async fn write_setpoint(&mut self, kelvin: f64) -> Result<()> {
        check_finite("setpoint", kelvin)?;
        self.command(format!("SETP {},{:.6}", self.output(), kelvin))
            .await
    }

    pub async fn read_heater_range(&mut self) -> Result<HeaterRange> {
        let reply = self.query(format!("RANGE? {}", self.output())).await?;
        let code = parse_int_reply(&reply)?;
        HeaterRange::try_from(code).map_err(|_| {
            LakeshoreError::protocol(format!("Instrument reported unknown heater range {}", code))
        })
    }

    pub async fn write_heater_range(&mut self, range: HeaterRange) -> Result<()> {
        self.command(format!("RANGE {},{}", self.output(), range.code()))
            .await
    }

    /// Heater output in percent
    pub async fn read_heater_output(&mut self) -> Result<f64> {
        let reply = self.query(format!("HTR? {}", self.output())).await?;
        parse_float_reply(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_reply_is_trimmed() {
        assert_eq!(parse_float_reply("299.98\r\n").unwrap(), 299.98);
        assert_eq!(parse_float_reply(" +0.00E+00\r\n").unwrap(), 0.0);
    }

    #[test]
    fn empty_reply_is_a_protocol_error() {
        let err = parse_float_reply("").unwrap_err();
        assert!(matches!(err, LakeshoreError::Protocol { .. }));
    }

    #[test]
    fn int_reply_accepts_sign() {
        assert_eq!(parse_int_reply("+2\r\n").unwrap(), 2);
        assert!(parse_int_reply("2.5").is_err());
    }

    #[test]
    fn non_finite_values_rejected() {
        assert!(check_finite("setpoint", f64::NAN).is_err());
        assert!(check_finite("setpoint", 300.0).is_ok());
    }
}
