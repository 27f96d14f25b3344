//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC channel, I²C master, GPIO directions, and the
//! shared-line pin mux using raw ESP-IDF sys calls.  Called once from
//! `main()` before the cycle loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    I2cInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::I2cInitFailed(rc) => write!(f, "I2C master init failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the cycle loop; single-threaded.
    unsafe {
        init_adc()?;
        init_i2c()?;
        init_gpio()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

/// ADC1 channel wired to the UV sensor output.
pub const ADC1_CH_UV: u32 = 4;

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the cycle loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ADC1_CH_UV, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 configured (CH{}=UV)", ADC1_CH_UV);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── I²C master (BMP280, DS3231, SCD30) ───────────────────────

#[cfg(target_os = "espidf")]
const I2C_PORT: i32 = 0;
#[cfg(target_os = "espidf")]
const I2C_TIMEOUT_TICKS: u32 = 100;

#[cfg(target_os = "espidf")]
unsafe fn init_i2c() -> Result<(), HwInitError> {
    let cfg = i2c_config_t {
        mode: i2c_mode_t_I2C_MODE_MASTER,
        sda_io_num: pins::I2C_SDA_GPIO,
        scl_io_num: pins::I2C_SCL_GPIO,
        sda_pullup_en: true,
        scl_pullup_en: true,
        __bindgen_anon_1: i2c_config_t__bindgen_ty_1 {
            master: i2c_config_t__bindgen_ty_1__bindgen_ty_1 {
                clk_speed: pins::I2C_FREQ_HZ,
            },
        },
        ..Default::default()
    };
    // SAFETY: single init call before the cycle loop; port 0 unused elsewhere.
    let ret = unsafe { i2c_param_config(I2C_PORT, &cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::I2cInitFailed(ret));
    }
    let ret = unsafe { i2c_driver_install(I2C_PORT, i2c_mode_t_I2C_MODE_MASTER, 0, 0, 0) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::I2cInitFailed(ret));
    }
    info!("hw_init: I2C master configured (100 kHz)");
    Ok(())
}

/// Write `data` to the device.  Returns the IDF return code (0 = OK).
#[cfg(target_os = "espidf")]
pub fn i2c_write(addr: u8, data: &[u8]) -> i32 {
    // SAFETY: driver installed in init_i2c(); main-loop access only.
    unsafe {
        i2c_master_write_to_device(I2C_PORT, addr, data.as_ptr(), data.len(), I2C_TIMEOUT_TICKS)
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn i2c_write(_addr: u8, _data: &[u8]) -> i32 {
    0
}

/// Read into `buf` from the device.  Returns the IDF return code (0 = OK).
#[cfg(target_os = "espidf")]
pub fn i2c_read(addr: u8, buf: &mut [u8]) -> i32 {
    // SAFETY: driver installed in init_i2c(); main-loop access only.
    unsafe {
        i2c_master_read_from_device(I2C_PORT, addr, buf.as_mut_ptr(), buf.len(), I2C_TIMEOUT_TICKS)
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn i2c_read(_addr: u8, _buf: &mut [u8]) -> i32 {
    0
}

/// Combined write-then-read transaction (register reads).
#[cfg(target_os = "espidf")]
pub fn i2c_write_read(addr: u8, cmd: &[u8], buf: &mut [u8]) -> i32 {
    // SAFETY: driver installed in init_i2c(); main-loop access only.
    unsafe {
        i2c_master_write_read_device(
            I2C_PORT,
            addr,
            cmd.as_ptr(),
            cmd.len(),
            buf.as_mut_ptr(),
            buf.len(),
            I2C_TIMEOUT_TICKS,
        )
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn i2c_write_read(_addr: u8, _cmd: &[u8], _buf: &mut [u8]) -> i32 {
    0
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio() -> Result<(), HwInitError> {
    // Indicator LED: plain output, driven HIGH (normally on) from boot.
    let led_cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::INDICATOR_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&led_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    unsafe { gpio_set_level(pins::INDICATOR_GPIO, 1) };

    // DHT22 data line: open-drain in/out with pull-up, idle HIGH.
    let dht_cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::DHT_DATA_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&dht_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    unsafe { gpio_set_level(pins::DHT_DATA_GPIO, 1) };

    // Shared MISO/1-Wire line starts in probe (released) mode.
    bus_route_shared_to_onewire();

    info!("hw_init: GPIO configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── Shared-line mux (SD MISO ↔ DS18B20 1-Wire) ───────────────
//
// The SD SPI peripheral and the probe share one physical pin.  These two
// functions perform the electrical handover; the bus arbiter owns the
// calling discipline.

/// Route the shared pin back to the SPI peripheral's MISO input and return
/// chip-select to SPI control.
#[cfg(target_os = "espidf")]
pub fn bus_route_shared_to_spi() {
    // SAFETY: pin mux writes from the single main context; the sdspi host
    // was configured against this pin at mount time.
    unsafe {
        gpio_set_direction(pins::SHARED_MISO_1W_GPIO, gpio_mode_t_GPIO_MODE_INPUT);
        gpio_set_pull_mode(pins::SHARED_MISO_1W_GPIO, gpio_pull_mode_t_GPIO_FLOATING);
        esp_rom_gpio_connect_in_signal(
            pins::SHARED_MISO_1W_GPIO as u32,
            spi_periph_signal[1].spiq_in as u32,
            false,
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn bus_route_shared_to_spi() {}

/// Detach the shared pin from SPI: chip-select forced HIGH, pin re-muxed
/// as open-drain GPIO with pull-up so the 1-Wire probe can talk.
#[cfg(target_os = "espidf")]
pub fn bus_route_shared_to_onewire() {
    // SAFETY: pin mux writes from the single main context; no SPI
    // transaction can be in flight (arbiter sequencing).
    unsafe {
        gpio_set_level(pins::SD_CS_GPIO, 1);
        esp_rom_gpio_connect_in_signal(
            GPIO_MATRIX_CONST_ONE_INPUT,
            spi_periph_signal[1].spiq_in as u32,
            false,
        );
        gpio_set_direction(
            pins::SHARED_MISO_1W_GPIO,
            gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD,
        );
        gpio_set_pull_mode(pins::SHARED_MISO_1W_GPIO, gpio_pull_mode_t_GPIO_PULLUP_ONLY);
        gpio_set_level(pins::SHARED_MISO_1W_GPIO, 1);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn bus_route_shared_to_onewire() {}
