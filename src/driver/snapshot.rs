use super::types::DeviceSnapshot;

impl super::Lakeshore335 {
    /// Read every readable attribute in turn. A failing read is recorded in
    /// its slot and does not stop the others.
    pub async fn snapshot(&mut self) -> DeviceSnapshot {
        let input_a = self.read_input_a().await.into();
        let input_b = self.read_input_b().await.into();
        let setpoint = self.read_setpoint().await.into();
        let heater_range = self.read_heater_range().await.into();
        let heater_output = self.read_heater_output().await.into();

        DeviceSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            state: self.state(),
            port: self.config.serial.port.clone(),
            output: self.read_output(),
            identity: self.identity.clone(),
            input_a,
            input_b,
            setpoint,
            heater_range,
            heater_output,
        }
    }
}
