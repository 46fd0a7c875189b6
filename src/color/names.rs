//! Symbolic color names.
//!
//! The subset of the X11 `rgb.txt` names that theme files actually use.
//! Entries are kept sorted by their lowercase key so lookup is a binary
//! search; names are matched case-insensitively with spaces ignored
//! ("light blue" and "LightBlue" are the same entry).

use super::Rgb;

/// Sorted (lowercase name, RGB) pairs.
const NAMES: &[(&str, Rgb)] = &[
    ("aquamarine", Rgb::new(0x7f, 0xff, 0xd4)),
    ("black", Rgb::new(0x00, 0x00, 0x00)),
    ("blue", Rgb::new(0x00, 0x00, 0xff)),
    ("brown", Rgb::new(0xa5, 0x2a, 0x2a)),
    ("cadetblue", Rgb::new(0x5f, 0x9e, 0xa0)),
    ("coral", Rgb::new(0xff, 0x7f, 0x50)),
    ("cornflowerblue", Rgb::new(0x64, 0x95, 0xed)),
    ("cyan", Rgb::new(0x00, 0xff, 0xff)),
    ("darkblue", Rgb::new(0x00, 0x00, 0x8b)),
    ("darkcyan", Rgb::new(0x00, 0x8b, 0x8b)),
    ("darkgray", Rgb::new(0xa9, 0xa9, 0xa9)),
    ("darkgreen", Rgb::new(0x00, 0x64, 0x00)),
    ("darkgrey", Rgb::new(0xa9, 0xa9, 0xa9)),
    ("darkmagenta", Rgb::new(0x8b, 0x00, 0x8b)),
    ("darkorchid", Rgb::new(0x99, 0x32, 0xcc)),
    ("darkred", Rgb::new(0x8b, 0x00, 0x00)),
    ("darkslateblue", Rgb::new(0x48, 0x3d, 0x8b)),
    ("darkslategray", Rgb::new(0x2f, 0x4f, 0x4f)),
    ("darkslategrey", Rgb::new(0x2f, 0x4f, 0x4f)),
    ("darkyellow", Rgb::new(0x8b, 0x8b, 0x00)),
    ("deeppink", Rgb::new(0xff, 0x14, 0x93)),
    ("deepskyblue", Rgb::new(0x00, 0xbf, 0xff)),
    ("firebrick", Rgb::new(0xb2, 0x22, 0x22)),
    ("gold", Rgb::new(0xff, 0xd7, 0x00)),
    ("goldenrod", Rgb::new(0xda, 0xa5, 0x20)),
    ("gray", Rgb::new(0xbe, 0xbe, 0xbe)),
    ("green", Rgb::new(0x00, 0xff, 0x00)),
    ("greenyellow", Rgb::new(0xad, 0xff, 0x2f)),
    ("grey", Rgb::new(0xbe, 0xbe, 0xbe)),
    ("hotpink", Rgb::new(0xff, 0x69, 0xb4)),
    ("indianred", Rgb::new(0xcd, 0x5c, 0x5c)),
    ("khaki", Rgb::new(0xf0, 0xe6, 0x8c)),
    ("lightblue", Rgb::new(0xad, 0xd8, 0xe6)),
    ("lightcyan", Rgb::new(0xe0, 0xff, 0xff)),
    ("lightgray", Rgb::new(0xd3, 0xd3, 0xd3)),
    ("lightgreen", Rgb::new(0x90, 0xee, 0x90)),
    ("lightgrey", Rgb::new(0xd3, 0xd3, 0xd3)),
    ("lightmagenta", Rgb::new(0xff, 0xbb, 0xff)),
    ("lightred", Rgb::new(0xff, 0xbb, 0xbb)),
    ("lightseagreen", Rgb::new(0x20, 0xb2, 0xaa)),
    ("lightskyblue", Rgb::new(0x87, 0xce, 0xfa)),
    ("lightslateblue", Rgb::new(0x84, 0x70, 0xff)),
    ("lightsteelblue", Rgb::new(0xb0, 0xc4, 0xde)),
    ("lightyellow", Rgb::new(0xff, 0xff, 0xe0)),
    ("limegreen", Rgb::new(0x32, 0xcd, 0x32)),
    ("magenta", Rgb::new(0xff, 0x00, 0xff)),
    ("maroon", Rgb::new(0xb0, 0x30, 0x60)),
    ("mediumblue", Rgb::new(0x00, 0x00, 0xcd)),
    ("mediumorchid", Rgb::new(0xba, 0x55, 0xd3)),
    ("mediumpurple", Rgb::new(0x93, 0x70, 0xdb)),
    ("mediumseagreen", Rgb::new(0x3c, 0xb3, 0x71)),
    ("mediumspringgreen", Rgb::new(0x00, 0xfa, 0x9a)),
    ("navy", Rgb::new(0x00, 0x00, 0x80)),
    ("navyblue", Rgb::new(0x00, 0x00, 0x80)),
    ("olivedrab", Rgb::new(0x6b, 0x8e, 0x23)),
    ("orange", Rgb::new(0xff, 0xa5, 0x00)),
    ("orangered", Rgb::new(0xff, 0x45, 0x00)),
    ("orchid", Rgb::new(0xda, 0x70, 0xd6)),
    ("peru", Rgb::new(0xcd, 0x85, 0x3f)),
    ("pink", Rgb::new(0xff, 0xc0, 0xcb)),
    ("plum", Rgb::new(0xdd, 0xa0, 0xdd)),
    ("purple", Rgb::new(0xa0, 0x20, 0xf0)),
    ("red", Rgb::new(0xff, 0x00, 0x00)),
    ("rosybrown", Rgb::new(0xbc, 0x8f, 0x8f)),
    ("royalblue", Rgb::new(0x41, 0x69, 0xe1)),
    ("salmon", Rgb::new(0xfa, 0x80, 0x72)),
    ("seagreen", Rgb::new(0x2e, 0x8b, 0x57)),
    ("sienna", Rgb::new(0xa0, 0x52, 0x2d)),
    ("skyblue", Rgb::new(0x87, 0xce, 0xeb)),
    ("slateblue", Rgb::new(0x6a, 0x5a, 0xcd)),
    ("slategray", Rgb::new(0x70, 0x80, 0x90)),
    ("slategrey", Rgb::new(0x70, 0x80, 0x90)),
    ("springgreen", Rgb::new(0x00, 0xff, 0x7f)),
    ("steelblue", Rgb::new(0x46, 0x82, 0xb4)),
    ("tan", Rgb::new(0xd2, 0xb4, 0x8c)),
    ("thistle", Rgb::new(0xd8, 0xbf, 0xd8)),
    ("tomato", Rgb::new(0xff, 0x63, 0x47)),
    ("turquoise", Rgb::new(0x40, 0xe0, 0xd0)),
    ("violet", Rgb::new(0xee, 0x82, 0xee)),
    ("violetred", Rgb::new(0xd0, 0x20, 0x90)),
    ("wheat", Rgb::new(0xf5, 0xde, 0xb3)),
    ("white", Rgb::new(0xff, 0xff, 0xff)),
    ("yellow", Rgb::new(0xff, 0xff, 0x00)),
    ("yellowgreen", Rgb::new(0x9a, 0xcd, 0x32)),
];

/// Look up a symbolic color name. Case-insensitive, spaces ignored.
pub fn lookup(name: &str) -> Option<Rgb> {
    let key: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    NAMES
        .binary_search_by(|(n, _)| n.cmp(&key.as_str()))
        .ok()
        .map(|i| NAMES[i].1)
}
