// ILI9488 panel driver: owns the spidev fd and the three GPIO lines

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use linux_embedded_hal::spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use linux_embedded_hal::sysfs_gpio::{Direction, Pin};
use tracing::{error, info};

use crate::config::SpiConfig;
use crate::render::fb::{DISPLAY_HEIGHT, DISPLAY_WIDTH, Frame};

const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

/// RGB666, 3 bytes per pixel.
const PIXFMT_18BPP: u8 = 0x66;
/// Row/column exchange + BGR order: landscape.
const MADCTL_LANDSCAPE: u8 = 0x28;

/// Big-endian start/end pair for a CASET or RASET command.
pub fn window_bytes(start: u16, end: u16) -> [u8; 4] {
    [
        (start >> 8) as u8,
        (start & 0xFF) as u8,
        (end >> 8) as u8,
        (end & 0xFF) as u8,
    ]
}

/// Clamp a requested rectangle to the display; `None` when nothing is left.
pub fn clamp_rect(x: i32, y: i32, w: i32, h: i32) -> Option<(i32, i32, i32, i32)> {
    if w <= 0 || h <= 0 {
        return None;
    }
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(DISPLAY_WIDTH as i32);
    let y1 = (y + h).min(DISPLAY_HEIGHT as i32);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0, y0, x1 - x0, y1 - y0))
}

/// Expand RGB565 pixels to the panel's 3-byte RGB666 wire format:
/// R5<<3, G6<<2, B5<<3.
pub fn encode_rgb666(src: &[u16], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(src.len() * 3);
    for &px in src {
        let r5 = ((px >> 11) & 0x1F) as u8;
        let g6 = ((px >> 5) & 0x3F) as u8;
        let b5 = (px & 0x1F) as u8;
        out.push(r5 << 3);
        out.push(g6 << 2);
        out.push(b5 << 3);
    }
}

fn init_output_pin(pin: &Pin) -> Result<()> {
    pin.export().context("exporting GPIO pin")?;
    // sysfs needs a moment before the direction attribute appears.
    for _ in 0..10 {
        if pin.set_direction(Direction::Out).is_ok() {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(50));
    }
    pin.set_direction(Direction::Out)
        .context("setting GPIO direction")
}

/// The panel, its SPI descriptor and GPIO lines. Owned exclusively by the
/// render thread after init; no other component touches the hardware.
pub struct Ili9488 {
    spi: Spidev,
    dc: Pin,
    rst: Pin,
    bl: Pin,
    speed_hz: u32,
    chunk_bytes: usize,
    throttle_us: u64,
    offset_x: u16,
    offset_y: u16,
    tx_buf: Vec<u8>,
}

impl Ili9488 {
    /// Open the SPI device and request the GPIO lines. Fatal on failure;
    /// the process cannot run without the panel.
    pub fn open(cfg: &SpiConfig) -> Result<Self> {
        let dc = Pin::new(cfg.dc_pin);
        let rst = Pin::new(cfg.rst_pin);
        let bl = Pin::new(cfg.bl_pin);
        init_output_pin(&dc).with_context(|| format!("DC line (gpio {})", cfg.dc_pin))?;
        init_output_pin(&rst).with_context(|| format!("RST line (gpio {})", cfg.rst_pin))?;
        init_output_pin(&bl).with_context(|| format!("BL line (gpio {})", cfg.bl_pin))?;

        let mut spi = Spidev::open(&cfg.device)
            .with_context(|| format!("opening SPI device {}", cfg.device))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(cfg.speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options).context("configuring SPI")?;

        info!(
            speed_hz = cfg.speed_hz,
            chunk = cfg.chunk_bytes,
            throttle_us = cfg.throttle_us,
            "panel: {}x{} RGB666 landscape on {}",
            DISPLAY_WIDTH,
            DISPLAY_HEIGHT,
            cfg.device
        );

        Ok(Self {
            spi,
            dc,
            rst,
            bl,
            speed_hz: cfg.speed_hz,
            chunk_bytes: cfg.chunk_bytes,
            throttle_us: cfg.throttle_us,
            offset_x: cfg.offset_x,
            offset_y: cfg.offset_y,
            tx_buf: Vec::with_capacity(cfg.chunk_bytes),
        })
    }

    /// Hardware reset pulse followed by the wake-up command sequence, with
    /// the dwell times the controller requires after each step.
    pub fn init(&mut self) -> Result<()> {
        self.rst.set_value(1).context("RST high")?;
        thread::sleep(Duration::from_millis(10));
        self.rst.set_value(0).context("RST low")?;
        thread::sleep(Duration::from_millis(20));
        self.rst.set_value(1).context("RST high")?;
        thread::sleep(Duration::from_millis(120));

        self.command(SWRESET, &[])?;
        thread::sleep(Duration::from_millis(150));
        self.command(SLPOUT, &[])?;
        thread::sleep(Duration::from_millis(120));
        self.command(COLMOD, &[PIXFMT_18BPP])?;
        thread::sleep(Duration::from_millis(10));
        self.command(MADCTL, &[MADCTL_LANDSCAPE])?;
        thread::sleep(Duration::from_millis(10));
        self.command(DISPON, &[])?;
        thread::sleep(Duration::from_millis(100));

        self.set_backlight(true)?;
        Ok(())
    }

    fn command(&mut self, cmd: u8, data: &[u8]) -> Result<()> {
        self.dc.set_value(0).context("DC low")?;
        self.spi
            .transfer(&mut SpidevTransfer::write(&[cmd]))
            .with_context(|| format!("sending command {cmd:#04x}"))?;
        if !data.is_empty() {
            self.send_data(data)?;
        }
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> Result<()> {
        self.dc.set_value(1).context("DC high")?;
        self.spi
            .transfer(&mut SpidevTransfer::write(data))
            .context("sending data")?;
        Ok(())
    }

    /// Program the write window; both endpoints are inclusive and shifted
    /// by the configured panel offsets.
    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<()> {
        let cx = window_bytes(x0 + self.offset_x, x1 + self.offset_x);
        let cy = window_bytes(y0 + self.offset_y, y1 + self.offset_y);
        self.command(CASET, &cx)?;
        self.command(RASET, &cy)?;
        self.command(RAMWR, &[])?;
        Ok(())
    }

    /// Transmit one rectangle of the source buffer. Pixels are expanded to
    /// RGB666 into a reusable buffer and sent in configured-size chunks;
    /// an ioctl failure aborts the rectangle (no mid-frame retry).
    pub fn update_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        src: &[u16],
        stride_px: usize,
    ) -> Result<()> {
        let Some((x0, y0, rw, rh)) = clamp_rect(x, y, w, h) else {
            return Ok(());
        };

        self.set_window(
            x0 as u16,
            y0 as u16,
            (x0 + rw - 1) as u16,
            (y0 + rh - 1) as u16,
        )?;
        self.dc.set_value(1).context("DC high")?;

        let chunk_pixels = (self.chunk_bytes / 3).max(1);
        let mut sent_bytes: usize = 0;
        let mut chunk_index: usize = 0;

        for row in 0..rh {
            let row_start = (y0 + row) as usize * stride_px + x0 as usize;
            let row_px = &src[row_start..row_start + rw as usize];
            for chunk in row_px.chunks(chunk_pixels) {
                encode_rgb666(chunk, &mut self.tx_buf);
                if let Err(e) = self.spi.transfer(&mut SpidevTransfer::write(&self.tx_buf)) {
                    error!(
                        chunk = chunk_index,
                        bytes_sent = sent_bytes,
                        chunk_bytes = self.chunk_bytes,
                        speed_hz = self.speed_hz,
                        "SPI chunk transfer failed: {e}"
                    );
                    return Err(e).context("SPI transfer");
                }
                sent_bytes += chunk.len() * 3;
                chunk_index += 1;
                if self.throttle_us > 0 {
                    thread::sleep(Duration::from_micros(self.throttle_us));
                }
            }
        }
        Ok(())
    }

    pub fn push_full(&mut self, frame: &Frame) -> Result<()> {
        self.update_rect(
            0,
            0,
            frame.width as i32,
            frame.height as i32,
            &frame.px,
            frame.width,
        )
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.bl
            .set_value(if on { 1 } else { 0 })
            .context("setting backlight")
    }

    /// Final quiesce: backlight off. The controller keeps its RAM.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.set_backlight(false) {
            error!("backlight off failed at shutdown: {e}");
        }
    }
}
