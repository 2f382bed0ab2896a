use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use webform::form::parse_options;
use webform::portal::{DeviceRestart, TcpAcceptor};
use webform::{Form, FormSession, Outcome, PortalConfig};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

const TIMEZONES: &str =
    "UTC, Europe/London, Europe/Berlin, America/New_York, Asia/Shanghai, Asia/Tokyo";

#[derive(Debug, Clone)]
struct Setting {
    ssid: String,
    pass: String,
    timezone: String,
    wake_hour: i32,
    led_color: u32,
}

impl Default for Setting {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            pass: String::new(),
            timezone: "UTC".to_string(),
            wake_hour: 7,
            led_color: 0x00D4FF,
        }
    }
}

impl Setting {
    const FIELDS: usize = 5;

    fn describe(&self, form: &mut Form<'_>) {
        let timezone = parse_options(TIMEZONES)
            .iter()
            .position(|tz| *tz == self.timezone)
            .unwrap_or(0);

        form.add_subheading("WiFi");
        form.add_text("SSID", &self.ssid);
        form.add_text("Password", &self.pass);
        form.add_subheading("Clock");
        form.add_dropdown("Timezone", TIMEZONES, timezone, true);
        form.add_dropdown_range("Wake hour", 0, 23, self.wake_hour);
        form.add_subheading("Display");
        form.add_color_picker("LED color", self.led_color);
    }

    fn apply(&mut self, index: usize, value: String) {
        match index {
            1 => self.ssid = value,
            2 => self.pass = value,
            3 => self.timezone = value,
            4 => match value.parse() {
                Ok(hour) => self.wake_hour = hour,
                Err(e) => log::warn!("Invalid wake hour {:?}: {}", value, e),
            },
            5 => match value.parse() {
                Ok(color) => self.led_color = color,
                Err(e) => log::warn!("Invalid LED color {:?}: {}", value, e),
            },
            _ => log::warn!("Unexpected field {}", index),
        }

        if index == Self::FIELDS {
            log::info!("SSID: {:?}", self.ssid);
            log::info!("Timezone: {:?}", self.timezone);
            log::info!("Wake hour: {}", self.wake_hour);
            log::info!("LED color: #{:06X}", self.led_color);
        }
    }
}

#[cfg(target_os = "espidf")]
fn init_logger() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
}

#[cfg(not(target_os = "espidf"))]
fn init_logger() {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn main() -> anyhow::Result<()> {
    init_logger();

    let config = PortalConfig::from_env()?;
    log::info!("Title: {:?}", config.title);

    #[cfg(target_os = "espidf")]
    let _ap = {
        let peripherals = esp_idf_svc::hal::prelude::Peripherals::take()?;
        let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
        webform::portal::SoftAp::start(peripherals.modem, sysloop, &config.ap_ssid)?
    };

    let listener = TcpAcceptor::bind(config.port, config.read_timeout())?;
    #[cfg(target_os = "espidf")]
    log::info!(
        "Config form at http://{}:{}",
        webform::portal::SoftAp::ip(),
        listener.local_port()?
    );
    #[cfg(not(target_os = "espidf"))]
    log::info!("Config form listening on port {}", listener.local_port()?);

    let setting = Rc::new(RefCell::new(Setting::default()));
    let mut session = FormSession::new(listener, DeviceRestart, &config);

    let s = setting.clone();
    session.set_form_builder(move |form| s.borrow().describe(form));
    let s = setting.clone();
    session.set_callback(move |index, value| s.borrow_mut().apply(index, value));

    loop {
        match session.handle_client() {
            Ok(Outcome::Idle) => std::thread::sleep(POLL_INTERVAL),
            Ok(outcome) => log::debug!("{:?}", outcome),
            Err(e) => log::error!("Failed to handle client: {:?}", e),
        }
    }
}
