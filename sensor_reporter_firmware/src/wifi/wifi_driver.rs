use crate::microcontroller_src::peripherals::PeripheralError;
use esp_idf_svc::{
    eventloop::{EspSubscription, EspSystemEventLoop, System},
    hal::modem,
    nvs::EspDefaultNvsPartition,
    sys::{esp_wifi_connect, EspError},
    timer::EspTaskTimerService,
    wifi::{AsyncWifi, AuthMethod, ClientConfiguration, Configuration, EspWifi, WifiEvent},
};
use log::{info, warn};
use sensor_reporter_core::{connected_or_offline, Link, RejoinPolicy, StationEvent};
use std::{net::Ipv4Addr, sync::Arc};

/// Error types related to WIFI operations.
#[derive(Debug)]
pub enum WifiError {
    ConfigurationError,
    ConnectingError,
    InformationError,
    NvsAlreadyTaken,
    PeripheralError(PeripheralError),
    StartingError,
    SubscriptionError,
    WifiNotInitialized,
}

/// Abstraction of the driver that controls the wifi station.
///
/// Once `connect` has been called the station rejoins the network on its own
/// every time it gets disconnected, without blocking the caller.
pub struct WifiDriver<'a> {
    controller: AsyncWifi<EspWifi<'a>>,
    event_loop: EspSystemEventLoop,
    rejoin: Arc<RejoinPolicy>,
    rejoin_subscription: Option<EspSubscription<'static, System>>,
}

impl<'a> WifiDriver<'a> {
    /// Creates a new WifiDriver.
    ///
    /// By default this function takes the Non-Volatile Storage of the ESP in order to save
    /// wifi configuration. This is to improve connection times for future connections
    /// to the same network.
    ///
    /// # Arguments
    ///
    /// - `event_loop`: Microcontroller's event loop.
    /// - `modem`: Microcontroller's modem peripheral.
    ///
    /// # Returns
    ///
    /// A `Result` containing the new `WifiDriver` instance, or a `WifiError` if the
    /// initialization failed.
    ///
    /// # Errors
    ///
    /// - `WifiError::NvsAlreadyTaken`: If the NVS Default Partition was already taken.
    /// - `WifiError::StartingError`: If there is an error initializing the driver.
    pub fn new(event_loop: EspSystemEventLoop, modem: modem::Modem) -> Result<Self, WifiError> {
        let nvs = EspDefaultNvsPartition::take().map_err(|_| WifiError::NvsAlreadyTaken)?;
        let timer_service = EspTaskTimerService::new().map_err(|_| WifiError::StartingError)?;
        let esp_wifi = EspWifi::new(modem, event_loop.clone(), Some(nvs))
            .map_err(|_| WifiError::StartingError)?;
        let controller = AsyncWifi::wrap(esp_wifi, event_loop.clone(), timer_service)
            .map_err(|_| WifiError::StartingError)?;
        Ok(WifiDriver {
            controller,
            event_loop,
            rejoin: Arc::new(RejoinPolicy::default()),
            rejoin_subscription: None,
        })
    }

    /// Connects to the desired wifi network and waits until the station has an ip.
    ///
    /// If a password is passed, it connects using the WPAWPA2Personal Authentication method.
    /// Otherwise, it doesn't use an Authentication method. From this call on, a lost
    /// association is retried in the background, even if this first attempt fails.
    ///
    /// # Arguments
    ///
    /// - `ssid`: The SSID to connect to. At most 32 bytes.
    /// - `password`: An Option that may contain the password of the SSID. At most 64 bytes.
    ///
    /// # Returns
    ///
    /// A `Result` with Ok if the station got an ip, or a `WifiError` otherwise.
    ///
    /// # Errors
    ///
    /// - `WifiError::ConfigurationError`: If the credentials do not fit or the driver rejects them.
    /// - `WifiError::SubscriptionError`: If the disconnect handler could not be registered.
    /// - `WifiError::StartingError`: Error while starting wifi driver.
    /// - `WifiError::ConnectingError`: Error while connecting to wifi.
    pub async fn connect(&mut self, ssid: &str, password: Option<&str>) -> Result<(), WifiError> {
        let auth_method = match password {
            Some(_) => AuthMethod::WPAWPA2Personal,
            None => AuthMethod::None,
        };

        let wifi_configuration = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| WifiError::ConfigurationError)?,
            bssid: None,
            auth_method,
            password: password
                .unwrap_or_default()
                .try_into()
                .map_err(|_| WifiError::ConfigurationError)?,
            channel: None,
            ..Default::default()
        });

        self.controller
            .set_configuration(&wifi_configuration)
            .map_err(|_| WifiError::ConfigurationError)?;

        self.subscribe_rejoin()?;
        self.rejoin.arm();

        self.controller
            .start()
            .await
            .map_err(|_| WifiError::StartingError)?;
        info!("Wifi started");

        self.controller
            .connect()
            .await
            .map_err(|_| WifiError::ConnectingError)?;
        info!("Wifi connected to {ssid}");

        self.controller
            .wait_netif_up()
            .await
            .map_err(|_| WifiError::ConnectingError)?;
        info!("Wifi netif up");

        Ok(())
    }

    /// Registers, once, the event loop handler that asks the station to associate
    /// again after a disconnection. The handler runs on the system event task, so
    /// the reporting loop never waits for it.
    fn subscribe_rejoin(&mut self) -> Result<(), WifiError> {
        if self.rejoin_subscription.is_some() {
            return Ok(());
        }
        let rejoin = self.rejoin.clone();
        let subscription = self
            .event_loop
            .subscribe::<WifiEvent, _>(move |event| {
                let station_event = match event {
                    WifiEvent::StaDisconnected { .. } => StationEvent::Disconnected,
                    WifiEvent::StaStopped => StationEvent::Stopped,
                    _ => return,
                };
                if rejoin.should_rejoin(station_event) {
                    info!("Wifi disconnected, rejoining");
                    if let Err(err) = EspError::convert(unsafe { esp_wifi_connect() }) {
                        warn!("Could not start rejoin: {:?}", err);
                    }
                }
            })
            .map_err(|_| WifiError::SubscriptionError)?;
        self.rejoin_subscription = Some(subscription);
        Ok(())
    }

    /// Checks if the driver is connected to a wifi network.
    ///
    /// # Returns
    ///
    /// A `Result` containing true if the station is associated.
    ///
    /// # Errors
    ///
    /// - `WifiError::WifiNotInitialized`: If WiFi is not initialized by esp_wifi_init.
    pub fn is_connected(&self) -> Result<bool, WifiError> {
        self.controller
            .is_connected()
            .map_err(|_| WifiError::WifiNotInitialized)
    }

    /// Get the ip address of the device.
    ///
    /// # Returns
    ///
    /// A `Result` containing the station's ipv4 address.
    ///
    /// # Errors
    ///
    /// - `WifiError::InformationError`: If WiFi driver can not get its own ip.
    pub fn get_address_info(&self) -> Result<Ipv4Addr, WifiError> {
        let netif = self.controller.wifi().sta_netif();
        let info = netif
            .get_ip_info()
            .map_err(|_| WifiError::InformationError)?;
        Ok(info.ip)
    }
}

impl Link for WifiDriver<'_> {
    fn is_connected(&self) -> bool {
        connected_or_offline(WifiDriver::is_connected(self))
    }
}

impl From<PeripheralError> for WifiError {
    fn from(value: PeripheralError) -> Self {
        Self::PeripheralError(value)
    }
}
