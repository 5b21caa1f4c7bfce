use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{debug, info, warn};
use part_monitor_common::Connectivity;

type Wifi = BlockingWifi<EspWifi<'static>>;

/// Station interface joined to the configured access point.
pub struct WifiLink {
    wifi: Wifi,
}

impl WifiLink {
    /// Starts the station and issues the first connect. Does not wait for the association.
    pub fn start(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        ssid: &str,
        password: &str,
    ) -> anyhow::Result<Self> {
        let mut wifi =
            BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

        let wifi_configuration: Configuration = Configuration::Client(ClientConfiguration {
            ssid: ssid
                .try_into()
                .map_err(|_| anyhow::anyhow!("SSID too long: {}", ssid))?,
            bssid: None,
            auth_method: if password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            password: password
                .try_into()
                .map_err(|_| anyhow::anyhow!("WiFi password too long"))?,
            channel: None,
            ..Default::default()
        });

        wifi.set_configuration(&wifi_configuration)?;

        wifi.start()?;
        info!("Wifi started");

        wifi.wifi_mut().connect()?;

        Ok(Self { wifi })
    }
}

impl Connectivity for WifiLink {
    /// Up means associated and holding an address. A dropped association gets a new connect.
    fn is_connected(&mut self) -> bool {
        match self.wifi.is_up() {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => warn!("Cannot query WiFi state: {}", e),
        }

        if !self.wifi.is_connected().unwrap_or(false) {
            if let Err(e) = self.wifi.wifi_mut().connect() {
                debug!("WiFi reconnect not issued: {}", e);
            }
        }
        false
    }
}
