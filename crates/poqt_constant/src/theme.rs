//! Urgency band colors for CLI output.
//!
//! Defined as (R, G, B) tuples for use with any terminal color library.
//! Only lists rendered as "colored" use these; "plain" lists print without color.

/// Row background per band
pub mod background {
    /// No due date: #ffffff
    pub const NONE: (u8, u8, u8) = (255, 255, 255);
    /// Low urgency: #e8f5e9
    pub const LOW: (u8, u8, u8) = (232, 245, 233);
    /// Mid urgency: #fff8e1
    pub const MID: (u8, u8, u8) = (255, 248, 225);
    /// High urgency: #ffe0b2
    pub const HIGH: (u8, u8, u8) = (255, 224, 178);
    /// Due now: #ffcdd2
    pub const DUE: (u8, u8, u8) = (255, 205, 210);
    /// Overdue: #df514c
    pub const OVERDUE: (u8, u8, u8) = (223, 81, 76);
}

/// Row text per band
pub mod text {
    pub const NONE: (u8, u8, u8) = (102, 102, 102);
    pub const LOW: (u8, u8, u8) = (76, 175, 80);
    pub const MID: (u8, u8, u8) = (255, 193, 7);
    pub const HIGH: (u8, u8, u8) = (255, 140, 0);
    pub const DUE: (u8, u8, u8) = (229, 57, 53);
    /// Overdue: #ffffff on the danger background
    pub const OVERDUE: (u8, u8, u8) = (255, 255, 255);
}

/// List title color
pub const LIST_TITLE: (u8, u8, u8) = (0, 188, 212);
