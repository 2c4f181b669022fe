// THEORY (1D Pixel Heuristics):
// The `Pixel` module is the most fundamental unit of the tracker. It is a "dumb"
// data container for a single RGBA pixel plus the one heuristic the referee needs
// from a pixel on its own: its position in hue-saturation-value space.
//
// Why HSV?
// - Marker colors are classified by hue and saturation. Both stay put when the
//   lighting in the room changes; only the value channel follows brightness.
// - The band bounds are written on the 8-bit HSV scale used by camera tooling:
//   hue is halved to fit a byte (0..180), saturation and value span 0..255.
//
// Key principles:
// 1) Single-pixel scope (1D): nothing here reads neighbors or history.
// 2) Integer in, integer out: the conversion rounds once, at the end.

pub mod pixel {
    pub type Channel = u8;

    /// Hue on the halved 8-bit scale, 0..180.
    pub type Hue = u8;
    pub type Saturation = u8;
    pub type Value = u8;

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
        pub alpha: Channel,
    }

    /// A pixel expressed in 8-bit hue-saturation-value space.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Hsv {
        pub hue: Hue,
        pub saturation: Saturation,
        pub value: Value,
    }

    impl Hsv {
        pub const fn new(hue: Hue, saturation: Saturation, value: Value) -> Self {
            Self { hue, saturation, value }
        }
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Self { red, green, blue, alpha }
        }

        /// HSV Value (V): brightness defined as max(R, G, B).
        pub fn value(&self) -> Value {
            self.red.max(self.green.max(self.blue))
        }

        /// Chroma (C): max(R,G,B) - min(R,G,B).
        pub fn chroma(&self) -> u8 {
            self.value() - self.red.min(self.green.min(self.blue))
        }

        /// Converts to 8-bit HSV.
        ///
        /// - Hue is computed in degrees [0, 360) and halved, so pure red is 0,
        ///   pure green 60 and pure blue 120.
        /// - Saturation is chroma relative to value, scaled to 0..255.
        /// - Grays (zero chroma) report hue 0 and saturation 0.
        pub fn hsv(&self) -> Hsv {
            let value = self.value();
            let chroma = self.chroma();
            if chroma == 0 {
                return Hsv::new(0, 0, value);
            }

            let saturation = (255.0 * chroma as f32 / value as f32).round() as u8;

            let red = self.red as f32;
            let green = self.green as f32;
            let blue = self.blue as f32;
            let chroma = chroma as f32;
            let mut hue_degrees = if value == self.red {
                60.0 * (green - blue) / chroma
            } else if value == self.green {
                120.0 + 60.0 * (blue - red) / chroma
            } else {
                240.0 + 60.0 * (red - green) / chroma
            };
            if hue_degrees < 0.0 {
                hue_degrees += 360.0;
            }

            // 359 degrees rounds to 180, which wraps back onto red.
            let hue = ((hue_degrees / 2.0).round() as u16 % 180) as u8;
            Hsv::new(hue, saturation, value)
        }
    }

    impl From<image::Rgba<u8>> for Pixel {
        fn from(rgba: image::Rgba<u8>) -> Self {
            let [red, green, blue, alpha] = rgba.0;
            Pixel::new(red, green, blue, alpha)
        }
    }

}
