//! The MCCS VCP code table.
//!
//! Names follow the MCCS 2.2 standard. Codes 0xE0 through 0xFF are reserved
//! for manufacturers and always resolve to an "OEM specific" entry.

use std::fmt;
use serde::Serialize;
use crate::VcpCode;

/// Frequently used VCP codes.
pub mod codes {
    #![allow(missing_docs)]

    use crate::VcpCode;

    pub const RESTORE_FACTORY_DEFAULTS: VcpCode = 0x04;
    pub const RESTORE_FACTORY_COLOR_DEFAULTS: VcpCode = 0x08;
    pub const BRIGHTNESS: VcpCode = 0x10;
    pub const CONTRAST: VcpCode = 0x12;
    pub const COLOR_PRESET: VcpCode = 0x14;
    pub const RED_GAIN: VcpCode = 0x16;
    pub const GREEN_GAIN: VcpCode = 0x18;
    pub const BLUE_GAIN: VcpCode = 0x1a;
    pub const INPUT_SOURCE: VcpCode = 0x60;
    pub const AUDIO_VOLUME: VcpCode = 0x62;
    pub const AUDIO_MUTE: VcpCode = 0x8d;
    pub const POWER_MODE: VcpCode = 0xd6;
    pub const VCP_VERSION: VcpCode = 0xdf;
}

/// How a feature's value is meant to be read.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    /// A trigger or on/off switch.
    Boolean,
    /// A number between zero and the reported maximum.
    Continuous,
    /// One of a set of discrete values, usually listed in the capabilities.
    Enumerated,
    /// Table, string or manufacturer data.
    Opaque,
}

/// Static description of a VCP code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FeatureInfo {
    /// The code.
    pub code: VcpCode,
    /// Human name.
    pub name: &'static str,
    /// What the control does.
    pub description: &'static str,
    /// Value semantics.
    pub kind: ValueKind,
}

impl fmt::Display for FeatureInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:02X} {}", self.code, self.name)
    }
}

macro_rules! features {
    ($($code:literal $kind:ident $name:literal $desc:literal;)*) => {
        &[$(FeatureInfo {
            code: $code,
            name: $name,
            description: $desc,
            kind: ValueKind::$kind,
        },)*]
    };
}

/// OEM codes, starting at this one, are not individually named.
pub const FIRST_OEM_CODE: VcpCode = 0xe0;

static STANDARD: &[FeatureInfo] = features! {
    0x00 Enumerated "Code Page" "Code page of text strings";
    0x01 Boolean "Degauss" "Run a CRT degauss cycle";
    0x02 Enumerated "New Control Value" "Signals that a control value changed on the display";
    0x03 Enumerated "Soft Controls" "Host-defined display buttons";
    0x04 Boolean "Restore Factory Defaults" "Restore all factory presets";
    0x05 Boolean "Restore Factory Luminance / Contrast Defaults" "Restore factory luminance and contrast";
    0x06 Boolean "Restore Factory Geometry Defaults" "Restore factory geometry";
    0x08 Boolean "Restore Factory Color Defaults" "Restore factory color settings";
    0x0A Boolean "Restore Factory TV Defaults" "Restore factory TV settings";
    0x0B Continuous "User Color Temperature Increment" "Step size of 0x0C in kelvin";
    0x0C Continuous "User Color Temperature" "White point color temperature";
    0x0E Continuous "Clock" "Sampling clock frequency";
    0x10 Continuous "Brightness" "Luminance of the image";
    0x11 Continuous "Flesh Tone Enhancement" "Flesh tone correction level";
    0x12 Continuous "Contrast" "Contrast of the image";
    0x13 Continuous "Backlight Control" "Backlight luminance";
    0x14 Enumerated "Select Color Preset" "Active color temperature preset";
    0x16 Continuous "Video Gain (Drive): Red" "Red luminance";
    0x17 Enumerated "User Color Vision Compensation" "Color vision deficiency compensation";
    0x18 Continuous "Video Gain (Drive): Green" "Green luminance";
    0x1A Continuous "Video Gain (Drive): Blue" "Blue luminance";
    0x1C Continuous "Focus" "Image focus";
    0x1E Boolean "Auto Setup" "Run automatic image adjustment";
    0x1F Boolean "Auto Color Setup" "Run automatic color adjustment";
    0x20 Continuous "Horizontal Position (Phase)" "Horizontal image position";
    0x22 Continuous "Horizontal Size" "Horizontal image size";
    0x24 Continuous "Horizontal Pincushion" "Horizontal side curvature";
    0x26 Continuous "Horizontal Pincushion Balance" "Horizontal side curvature balance";
    0x28 Continuous "Horizontal Convergence R/B" "Red and blue horizontal convergence";
    0x29 Continuous "Horizontal Convergence M/G" "Magenta and green horizontal convergence";
    0x2A Continuous "Horizontal Linearity" "Horizontal linearity";
    0x2C Continuous "Horizontal Linearity Balance" "Horizontal linearity balance";
    0x2E Continuous "Gray Scale Expansion" "Gray scale expansion";
    0x30 Continuous "Vertical Position (Phase)" "Vertical image position";
    0x32 Continuous "Vertical Size" "Vertical image size";
    0x34 Continuous "Vertical Pincushion" "Vertical side curvature";
    0x36 Continuous "Vertical Pincushion Balance" "Vertical side curvature balance";
    0x38 Continuous "Vertical Convergence R/B" "Red and blue vertical convergence";
    0x39 Continuous "Vertical Convergence M/G" "Magenta and green vertical convergence";
    0x3A Continuous "Vertical Linearity" "Vertical linearity";
    0x3C Continuous "Vertical Linearity Balance" "Vertical linearity balance";
    0x3E Continuous "Clock Phase" "Sampling clock phase";
    0x40 Continuous "Horizontal Parallelogram" "Horizontal skew";
    0x41 Continuous "Vertical Parallelogram" "Vertical skew";
    0x42 Continuous "Horizontal Keystone" "Horizontal keystone";
    0x43 Continuous "Vertical Keystone" "Vertical keystone";
    0x44 Continuous "Rotation" "Image rotation";
    0x46 Continuous "Top Corner Flare" "Top corner flare";
    0x48 Continuous "Top Corner Hook" "Top corner hook";
    0x4A Continuous "Bottom Corner Flare" "Bottom corner flare";
    0x4C Continuous "Bottom Corner Hook" "Bottom corner hook";
    0x52 Enumerated "Active Control" "FIFO of controls changed on the display";
    0x54 Enumerated "Performance Preservation" "Power and lifetime saving features";
    0x56 Continuous "Horizontal Moire" "Horizontal moire cancellation";
    0x58 Continuous "Vertical Moire" "Vertical moire cancellation";
    0x59 Continuous "6 Axis Saturation Control: Red" "Red saturation";
    0x5A Continuous "6 Axis Saturation Control: Yellow" "Yellow saturation";
    0x5B Continuous "6 Axis Saturation Control: Green" "Green saturation";
    0x5C Continuous "6 Axis Saturation Control: Cyan" "Cyan saturation";
    0x5D Continuous "6 Axis Saturation Control: Blue" "Blue saturation";
    0x5E Continuous "6 Axis Saturation Control: Magenta" "Magenta saturation";
    0x60 Enumerated "Input Select" "Active video input";
    0x62 Continuous "Audio: Speaker Volume" "Speaker volume";
    0x63 Enumerated "Speaker Select" "Active audio output";
    0x64 Continuous "Audio: Microphone Volume" "Microphone volume";
    0x65 Enumerated "Audio: Jack Connection Status" "Audio jack connection state";
    0x66 Enumerated "Ambient Light Sensor" "Ambient light sensor mode";
    0x6B Continuous "Backlight Level: White" "White backlight level";
    0x6C Continuous "Video Black Level: Red" "Red black level";
    0x6D Continuous "Backlight Level: Red" "Red backlight level";
    0x6E Continuous "Video Black Level: Green" "Green black level";
    0x6F Continuous "Backlight Level: Green" "Green backlight level";
    0x70 Continuous "Video Black Level: Blue" "Blue black level";
    0x71 Continuous "Backlight Level: Blue" "Blue backlight level";
    0x72 Enumerated "Gamma" "Gamma preset";
    0x73 Opaque "LUT Size" "Lookup table dimensions";
    0x74 Opaque "Single Point LUT Operation" "Lookup table point access";
    0x75 Opaque "Block LUT Operation" "Lookup table block access";
    0x76 Opaque "Remote Procedure Call" "Sequence of operations on the display";
    0x78 Opaque "Display Identification Data Operation" "EDID or DisplayID access";
    0x7C Continuous "Adjust Zoom" "Optical zoom";
    0x82 Enumerated "Horizontal Mirror (Flip)" "Horizontal image flip";
    0x84 Enumerated "Vertical Mirror (Flip)" "Vertical image flip";
    0x86 Enumerated "Display Scaling" "Image scaling mode";
    0x87 Continuous "Sharpness" "Image sharpness";
    0x88 Continuous "Velocity Scan Modulation" "Velocity scan modulation";
    0x8A Continuous "Color Saturation" "Color saturation";
    0x8B Enumerated "TV Channel Up / Down" "Step the TV channel";
    0x8C Continuous "TV Sharpness" "TV sharpness";
    0x8D Enumerated "Audio Mute / Screen Blank" "Speaker mute and screen blanking";
    0x8E Continuous "TV Contrast" "TV contrast";
    0x8F Continuous "Audio Treble" "Treble level";
    0x90 Continuous "Hue" "Image hue";
    0x91 Continuous "Audio Bass" "Bass level";
    0x92 Continuous "TV Black Level / Luminance" "TV black level";
    0x93 Continuous "Audio Balance L / R" "Left and right speaker balance";
    0x94 Enumerated "Audio Processor Mode" "Audio processing mode";
    0x95 Continuous "Window Position (TL_X)" "Window top left X";
    0x96 Continuous "Window Position (TL_Y)" "Window top left Y";
    0x97 Continuous "Window Position (BR_X)" "Window bottom right X";
    0x98 Continuous "Window Position (BR_Y)" "Window bottom right Y";
    0x9A Enumerated "Window Background" "Window background brightness";
    0x9B Continuous "6 Axis Hue Control: Red" "Red hue";
    0x9C Continuous "6 Axis Hue Control: Yellow" "Yellow hue";
    0x9D Continuous "6 Axis Hue Control: Green" "Green hue";
    0x9E Continuous "6 Axis Hue Control: Cyan" "Cyan hue";
    0x9F Continuous "6 Axis Hue Control: Blue" "Blue hue";
    0xA0 Continuous "6 Axis Hue Control: Magenta" "Magenta hue";
    0xA2 Boolean "Auto Setup On / Off" "Automatic image adjustment toggle";
    0xA4 Opaque "Window Mask Control" "Window mask";
    0xA5 Enumerated "Window Select" "Active window";
    0xA6 Continuous "Window Size" "Window size";
    0xA7 Continuous "Window Transparency" "Window transparency";
    0xAA Enumerated "Screen Orientation" "Screen orientation";
    0xAC Continuous "Horizontal Frequency" "Horizontal sync frequency, read only";
    0xAE Continuous "Vertical Frequency" "Vertical refresh rate, read only";
    0xB0 Enumerated "Settings" "Store or restore user settings";
    0xB2 Enumerated "Flat Panel Sub-Pixel Layout" "Sub-pixel layout";
    0xB4 Enumerated "Source Timing Mode" "Source timing mode";
    0xB5 Enumerated "Source Color Coding" "Source color coding";
    0xB6 Enumerated "Display Technology Type" "Display technology";
    0xB7 Enumerated "Monitor Status" "Monitor status";
    0xB8 Continuous "Packet Count" "DisplayPort packet count";
    0xB9 Continuous "Monitor X Origin" "Monitor X origin";
    0xBA Continuous "Monitor Y Origin" "Monitor Y origin";
    0xBB Continuous "Header Error Count" "Packet header error count";
    0xBC Continuous "Body CRC Error Count" "Packet body CRC error count";
    0xBD Continuous "Client ID" "Client identifier";
    0xBE Enumerated "Link Control" "Link state";
    0xC0 Continuous "Display Usage Time" "Hours of use";
    0xC2 Continuous "Display Descriptor Length" "Length of the display descriptor";
    0xC3 Opaque "Transmit Display Descriptor" "Display descriptor data";
    0xC4 Boolean "Enable Display of Display Descriptor" "Show the display descriptor";
    0xC6 Continuous "Application Enable Key" "Application enable key";
    0xC7 Continuous "Display Enable Key" "Display enable key";
    0xC8 Enumerated "Display Controller ID" "Controller manufacturer and type";
    0xC9 Continuous "Display Firmware Level" "Firmware version";
    0xCA Enumerated "OSD / Button Control" "On-screen display and button lock";
    0xCC Enumerated "OSD Language" "On-screen display language";
    0xCD Opaque "Status Indicators (Host)" "Host status indicators";
    0xCE Opaque "Auxiliary Display Size" "Auxiliary display size";
    0xCF Opaque "Auxiliary Display Data" "Auxiliary display data";
    0xD0 Enumerated "Output Select" "Active video output";
    0xD2 Opaque "Asset Tag" "Asset tag";
    0xD4 Enumerated "Stereo Video Mode" "Stereo video mode";
    0xD6 Enumerated "Power Mode" "Display power state";
    0xD7 Enumerated "Auxiliary Power Output" "Auxiliary power output";
    0xDA Enumerated "Scan Mode" "Overscan and underscan";
    0xDB Enumerated "Image Mode" "Image mode";
    0xDC Enumerated "Display Application" "Display mode preset";
    0xDE Opaque "Scratch Pad" "Host scratch register";
    0xDF Continuous "VCP Version" "MCCS version implemented";
};

static OEM: FeatureInfo = FeatureInfo {
    code: FIRST_OEM_CODE,
    name: "OEM specific",
    description: "Manufacturer specific control",
    kind: ValueKind::Opaque,
};

/// Look up a code. Every OEM code resolves; other unassigned codes don't.
pub fn lookup(code: VcpCode) -> Option<FeatureInfo> {
    if code >= FIRST_OEM_CODE {
        return Some(FeatureInfo {
            code,
            .. OEM
        })
    }

    STANDARD.binary_search_by_key(&code, |info| info.code)
        .ok()
        .map(|i| STANDARD[i])
}

/// Every code [`lookup`] resolves, in ascending order.
pub fn known_codes() -> impl Iterator<Item = FeatureInfo> {
    STANDARD.iter().cloned()
        .chain((FIRST_OEM_CODE..=0xff).filter_map(lookup))
}

/// The name of a code, or "Unknown".
pub fn name(code: VcpCode) -> &'static str {
    lookup(code).map(|info| info.name).unwrap_or("Unknown")
}
