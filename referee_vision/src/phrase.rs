// THEORY:
// A `Phrase` names one pre-recorded audio clip the referee can speak. The
// session never touches audio itself; it only decides which phrase comes next
// and hands it to a `PhrasePlayer`.
//
// There are three families:
// - start phrases, one of which opens every round;
// - outcome phrases, one for each non-empty set of colors caught moving;
// - the all-clear phrase, spoken when nobody moved in any round.

use crate::core_modules::color_band::TrackedColor;
use crate::core_modules::tracker::MoveFlags;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phrase {
    /// "Daruma-san ga koronda", spoken at one of several tempos.
    Start(StartTempo),
    Caught(CaughtSet),
    AllClear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartTempo {
    Three,
    Four,
    Five,
    Seven,
}

/// The seven non-empty subsets of {green, blue, red}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaughtSet {
    Green,
    Blue,
    Red,
    BlueGreen,
    BlueRed,
    RedGreen,
    All,
}

impl CaughtSet {
    /// Maps the colors flagged as moved to their announcement. `None` when nobody moved.
    pub fn from_flags(flags: &MoveFlags) -> Option<Self> {
        let green = flags[TrackedColor::Green];
        let blue = flags[TrackedColor::Blue];
        let red = flags[TrackedColor::Red];
        let set = match (green, blue, red) {
            (true, true, true) => CaughtSet::All,
            (true, true, false) => CaughtSet::BlueGreen,
            (false, true, true) => CaughtSet::BlueRed,
            (true, false, true) => CaughtSet::RedGreen,
            (false, true, false) => CaughtSet::Blue,
            (true, false, false) => CaughtSet::Green,
            (false, false, true) => CaughtSet::Red,
            (false, false, false) => return None,
        };
        Some(set)
    }
}

impl Phrase {
    pub const START_PHRASES: [Phrase; 4] = [
        Phrase::Start(StartTempo::Three),
        Phrase::Start(StartTempo::Four),
        Phrase::Start(StartTempo::Five),
        Phrase::Start(StartTempo::Seven),
    ];

    pub fn for_moves(flags: &MoveFlags) -> Option<Phrase> {
        CaughtSet::from_flags(flags).map(Phrase::Caught)
    }

    /// The audio asset file backing this phrase.
    pub fn asset(&self) -> &'static str {
        match self {
            Phrase::Start(StartTempo::Three) => "daruma_3.m4a",
            Phrase::Start(StartTempo::Four) => "daruma_4.m4a",
            Phrase::Start(StartTempo::Five) => "daruma_5.m4a",
            Phrase::Start(StartTempo::Seven) => "daruma_7.m4a",
            Phrase::Caught(CaughtSet::Green) => "ugoita_green.m4a",
            Phrase::Caught(CaughtSet::Blue) => "ugoita_blue.m4a",
            Phrase::Caught(CaughtSet::Red) => "ugoita_red.m4a",
            Phrase::Caught(CaughtSet::BlueGreen) => "ugoita_blue_green.m4a",
            Phrase::Caught(CaughtSet::BlueRed) => "ugoita_blue_red.m4a",
            Phrase::Caught(CaughtSet::RedGreen) => "ugoita_red_green.m4a",
            Phrase::Caught(CaughtSet::All) => "ugoita_all.m4a",
            Phrase::AllClear => "minnanokachi_3.m4a",
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Phrase::Start(_))
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset())
    }
}
