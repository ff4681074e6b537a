//! Wire markers shared by the reader and the writer.

/// Escape marker. Starts every directive and escapes literal strings.
pub const ESC: char = '~';

/// Sub-marker. Starts every rolling-cache token.
pub const SUB: char = '^';

/// Reserved marker.
pub const RES: char = '`';

/// Prefix of every structural tag key.
pub const TAG: &str = "~#";

/// First element of a JSON array that encodes a map as `["^ ", k, v, ...]`.
pub const MAP_AS_ARRAY: &str = "^ ";

/// Structural tag keys.
pub mod tags {
    pub const QUOTE: &str = "~#'";
    pub const INSTANT: &str = "~#t";
    pub const SET: &str = "~#set";
    pub const LIST: &str = "~#list";
    pub const CMAP: &str = "~#cmap";
    pub const INTS: &str = "~#ints";
    pub const LONGS: &str = "~#longs";
    pub const FLOATS: &str = "~#floats";
    pub const DOUBLES: &str = "~#doubles";
    pub const BOOLS: &str = "~#bools";
}

/// Two-character scalar directive prefixes.
pub mod directives {
    pub const KEYWORD: &str = "~:";
    pub const SYMBOL: &str = "~$";
    pub const BYTES: &str = "~b";
    pub const FLOAT: &str = "~d";
    pub const BIG_DECIMAL: &str = "~f";
    pub const BIG_INTEGER: &str = "~n";
    pub const CHAR: &str = "~c";
    pub const INSTANT: &str = "~t";
    pub const INSTANT_MILLIS: &str = "~m";
    pub const UUID: &str = "~u";
    pub const URI: &str = "~r";
    pub const SPECIAL_NUMBER: &str = "~z";
}
