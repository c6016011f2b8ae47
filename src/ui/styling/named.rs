//! CSS named colors, for themes that set graph colors by name.

use super::colors::HexColor;

const fn c(hex: u32) -> HexColor {
    HexColor::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

const NAMED_COLORS: &[(&str, HexColor)] = &[
    ("aliceblue", c(0xf0f8ff)),
    ("antiquewhite", c(0xfaebd7)),
    ("aqua", c(0x00ffff)),
    ("aquamarine", c(0x7fffd4)),
    ("azure", c(0xf0ffff)),
    ("beige", c(0xf5f5dc)),
    ("bisque", c(0xffe4c4)),
    ("black", c(0x000000)),
    ("blanchedalmond", c(0xffebcd)),
    ("blue", c(0x0000ff)),
    ("blueviolet", c(0x8a2be2)),
    ("brown", c(0xa52a2a)),
    ("burlywood", c(0xdeb887)),
    ("cadetblue", c(0x5f9ea0)),
    ("chartreuse", c(0x7fff00)),
    ("chocolate", c(0xd2691e)),
    ("coral", c(0xff7f50)),
    ("cornflowerblue", c(0x6495ed)),
    ("cornsilk", c(0xfff8dc)),
    ("crimson", c(0xdc143c)),
    ("cyan", c(0x00ffff)),
    ("darkblue", c(0x00008b)),
    ("darkcyan", c(0x008b8b)),
    ("darkgoldenrod", c(0xb8860b)),
    ("darkgray", c(0xa9a9a9)),
    ("darkgreen", c(0x006400)),
    ("darkgrey", c(0xa9a9a9)),
    ("darkkhaki", c(0xbdb76b)),
    ("darkmagenta", c(0x8b008b)),
    ("darkolivegreen", c(0x556b2f)),
    ("darkorange", c(0xff8c00)),
    ("darkorchid", c(0x9932cc)),
    ("darkred", c(0x8b0000)),
    ("darksalmon", c(0xe9967a)),
    ("darkseagreen", c(0x8fbc8f)),
    ("darkslateblue", c(0x483d8b)),
    ("darkslategray", c(0x2f4f4f)),
    ("darkslategrey", c(0x2f4f4f)),
    ("darkturquoise", c(0x00ced1)),
    ("darkviolet", c(0x9400d3)),
    ("deeppink", c(0xff1493)),
    ("deepskyblue", c(0x00bfff)),
    ("dimgray", c(0x696969)),
    ("dimgrey", c(0x696969)),
    ("dodgerblue", c(0x1e90ff)),
    ("firebrick", c(0xb22222)),
    ("floralwhite", c(0xfffaf0)),
    ("forestgreen", c(0x228b22)),
    ("fuchsia", c(0xff00ff)),
    ("gainsboro", c(0xdcdcdc)),
    ("ghostwhite", c(0xf8f8ff)),
    ("gold", c(0xffd700)),
    ("goldenrod", c(0xdaa520)),
    ("gray", c(0x808080)),
    ("green", c(0x008000)),
    ("greenyellow", c(0xadff2f)),
    ("grey", c(0x808080)),
    ("honeydew", c(0xf0fff0)),
    ("hotpink", c(0xff69b4)),
    ("indianred", c(0xcd5c5c)),
    ("indigo", c(0x4b0082)),
    ("ivory", c(0xfffff0)),
    ("khaki", c(0xf0e68c)),
    ("lavender", c(0xe6e6fa)),
    ("lavenderblush", c(0xfff0f5)),
    ("lawngreen", c(0x7cfc00)),
    ("lemonchiffon", c(0xfffacd)),
    ("lightblue", c(0xadd8e6)),
    ("lightcoral", c(0xf08080)),
    ("lightcyan", c(0xe0ffff)),
    ("lightgoldenrodyellow", c(0xfafad2)),
    ("lightgray", c(0xd3d3d3)),
    ("lightgreen", c(0x90ee90)),
    ("lightgrey", c(0xd3d3d3)),
    ("lightpink", c(0xffb6c1)),
    ("lightsalmon", c(0xffa07a)),
    ("lightseagreen", c(0x20b2aa)),
    ("lightskyblue", c(0x87cefa)),
    ("lightslategray", c(0x778899)),
    ("lightslategrey", c(0x778899)),
    ("lightsteelblue", c(0xb0c4de)),
    ("lightyellow", c(0xffffe0)),
    ("lime", c(0x00ff00)),
    ("limegreen", c(0x32cd32)),
    ("linen", c(0xfaf0e6)),
    ("magenta", c(0xff00ff)),
    ("maroon", c(0x800000)),
    ("mediumaquamarine", c(0x66cdaa)),
    ("mediumblue", c(0x0000cd)),
    ("mediumorchid", c(0xba55d3)),
    ("mediumpurple", c(0x9370db)),
    ("mediumseagreen", c(0x3cb371)),
    ("mediumslateblue", c(0x7b68ee)),
    ("mediumspringgreen", c(0x00fa9a)),
    ("mediumturquoise", c(0x48d1cc)),
    ("mediumvioletred", c(0xc71585)),
    ("midnightblue", c(0x191970)),
    ("mintcream", c(0xf5fffa)),
    ("mistyrose", c(0xffe4e1)),
    ("moccasin", c(0xffe4b5)),
    ("navajowhite", c(0xffdead)),
    ("navy", c(0x000080)),
    ("oldlace", c(0xfdf5e6)),
    ("olive", c(0x808000)),
    ("olivedrab", c(0x6b8e23)),
    ("orange", c(0xffa500)),
    ("orangered", c(0xff4500)),
    ("orchid", c(0xda70d6)),
    ("palegoldenrod", c(0xeee8aa)),
    ("palegreen", c(0x98fb98)),
    ("paleturquoise", c(0xafeeee)),
    ("palevioletred", c(0xdb7093)),
    ("papayawhip", c(0xffefd5)),
    ("peachpuff", c(0xffdab9)),
    ("peru", c(0xcd853f)),
    ("pink", c(0xffc0cb)),
    ("plum", c(0xdda0dd)),
    ("powderblue", c(0xb0e0e6)),
    ("purple", c(0x800080)),
    ("rebeccapurple", c(0x663399)),
    ("red", c(0xff0000)),
    ("rosybrown", c(0xbc8f8f)),
    ("royalblue", c(0x4169e1)),
    ("saddlebrown", c(0x8b4513)),
    ("salmon", c(0xfa8072)),
    ("sandybrown", c(0xf4a460)),
    ("seagreen", c(0x2e8b57)),
    ("seashell", c(0xfff5ee)),
    ("sienna", c(0xa0522d)),
    ("silver", c(0xc0c0c0)),
    ("skyblue", c(0x87ceeb)),
    ("slateblue", c(0x6a5acd)),
    ("slategray", c(0x708090)),
    ("slategrey", c(0x708090)),
    ("snow", c(0xfffafa)),
    ("springgreen", c(0x00ff7f)),
    ("steelblue", c(0x4682b4)),
    ("tan", c(0xd2b48c)),
    ("teal", c(0x008080)),
    ("thistle", c(0xd8bfd8)),
    ("tomato", c(0xff6347)),
    ("turquoise", c(0x40e0d0)),
    ("violet", c(0xee82ee)),
    ("wheat", c(0xf5deb3)),
    ("white", c(0xffffff)),
    ("whitesmoke", c(0xf5f5f5)),
    ("yellow", c(0xffff00)),
    ("yellowgreen", c(0x9acd32)),
];

/// Looks up a CSS color name, ignoring ASCII case.
pub fn named_color(name: &str) -> Option<HexColor> {
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|&(_, color)| color)
}
