use super::Lakeshore335;
use super::types::LoopInput;
use crate::error::{LakeshoreError, Result};

impl Lakeshore335 {
    /// Send operator text as-is. Text containing `?` is sent as a query and the
    /// raw reply is returned; anything else is a command and returns `""`.
    pub async fn write_raw(&mut self, text: &str) -> Result<String> {
        self.logger.debug(&format!("Raw write '{}'", text));
        self.link()?.execute_raw(text).await
    }

    /// Read one pending reply line without sending anything
    pub async fn read_raw(&mut self) -> Result<String> {
        self.link()?.read_line().await
    }

    /// Select the sensor input driving the bound output's control loop.
    ///
    /// Codes other than 0 (none), 1 (input A) and 2 (input B) are refused with a
    /// warning and nothing is sent.
    pub async fn loop_select_input(&mut self, input: i64) -> Result<()> {
        let input = match LoopInput::try_from(input) {
            Ok(i) => i,
            Err(_) => {
                self.logger
                    .warn("Input must be 0=None, 1=Input A, 2=Input B");
                return Ok(());
            }
        };
        self.command(format!("OUTMODE {},1,{},0", self.output(), input.code()))
            .await
    }

    /// Enable or disable setpoint ramping. Negative rates are sent as their
    /// magnitude.
    pub async fn ramp(&mut self, enable: bool, rate: f64) -> Result<()> {
        if !rate.is_finite() {
            return Err(LakeshoreError::validation(
                "rate".to_string(),
                format!("{} is not a finite number", rate),
            ));
        }
        let flag = u8::from(enable);
        self.command(format!("OUTMODE {},{},{:.6}", self.output(), flag, rate.abs()))
            .await
    }
}
