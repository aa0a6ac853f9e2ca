// unicode.rs - Unicode property and POSIX class name tables.
//
// The property map is keyed by slug: lowercase with `[-_ ]` stripped.
// Lookups return the canonical display form of the spelling that was
// slugged, so `\p{decimal number}` and `\p{Nd}` keep their own shapes.

/// POSIX bracket-expression class names, `[[:name:]]`.
pub const POSIX_CLASS_NAMES: &[&str] = &[
    "alnum", "alpha", "ascii", "blank", "cntrl", "digit", "graph", "lower", "print", "punct",
    "space", "upper", "word", "xdigit",
];

pub fn is_posix_class_name(name: &str) -> bool {
    POSIX_CLASS_NAMES.contains(&name)
}

/// Lowercase `name` and strip `-`, `_`, and spaces.
pub fn slug(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Normalize an unknown property name: trim, collapse `[-_ ]+` runs to
/// `_`, split CamelCase humps, then title-case every `_`-separated word.
pub fn normalize_property_name(name: &str) -> String {
    let trimmed = name.trim();

    // Collapse separator runs and split camel humps in one walk.
    let mut spaced = String::with_capacity(trimmed.len() + 4);
    let mut prev: Option<char> = None;
    for c in trimmed.chars() {
        if matches!(c, '-' | '_' | ' ') {
            if !matches!(prev, Some('_') | None) {
                spaced.push('_');
            }
            prev = Some('_');
            continue;
        }
        if let Some(p) = prev {
            if p != '_' && c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()) {
                spaced.push('_');
            }
        }
        spaced.push(c);
        prev = Some(c);
    }

    spaced
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            let first: String = chars
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default();
            first + &chars.as_str().to_lowercase()
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Slug → canonical-name map for Unicode property validation.
#[derive(Clone, Debug, Default)]
pub struct PropertyMap {
    entries: Vec<(String, String)>,
}

impl PropertyMap {
    /// Map covering the general categories, the common binary
    /// properties, and the scripts patterns in the wild actually use.
    pub fn builtin() -> PropertyMap {
        PropertyMap {
            entries: PROPERTY_NAMES
                .iter()
                .map(|&(s, c)| (s.to_string(), c.to_string()))
                .collect(),
        }
    }

    /// Build from `(name, canonical)` pairs; keys are slugged here.
    pub fn from_pairs<I, S>(pairs: I) -> PropertyMap
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        PropertyMap {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (slug(k.as_ref()), v.as_ref().to_string()))
                .collect(),
        }
    }

    pub fn get(&self, slug: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == slug)
            .map(|(_, v)| v.as_str())
    }
}

/// Short alias for a canonical property name, for `useUnicodeAliases`.
pub fn property_short_alias(canonical: &str) -> Option<&'static str> {
    PROPERTY_ALIASES
        .iter()
        .find(|&&(long, _)| long == canonical)
        .map(|&(_, short)| short)
}

// (slug, canonical) rows. Both the long and the short spelling of a name
// get a row so each keeps its own canonical display form.
static PROPERTY_NAMES: &[(&str, &str)] = &[
    // General categories: single letters
    ("c", "C"),
    ("l", "L"),
    ("m", "M"),
    ("n", "N"),
    ("p", "P"),
    ("s", "S"),
    ("z", "Z"),
    // General categories: two letters
    ("cc", "Cc"),
    ("cf", "Cf"),
    ("cn", "Cn"),
    ("co", "Co"),
    ("cs", "Cs"),
    ("ll", "Ll"),
    ("lm", "Lm"),
    ("lo", "Lo"),
    ("lt", "Lt"),
    ("lu", "Lu"),
    ("mc", "Mc"),
    ("me", "Me"),
    ("mn", "Mn"),
    ("nd", "Nd"),
    ("nl", "Nl"),
    ("no", "No"),
    ("pc", "Pc"),
    ("pd", "Pd"),
    ("pe", "Pe"),
    ("pf", "Pf"),
    ("pi", "Pi"),
    ("po", "Po"),
    ("ps", "Ps"),
    ("sc", "Sc"),
    ("sk", "Sk"),
    ("sm", "Sm"),
    ("so", "So"),
    ("zl", "Zl"),
    ("zp", "Zp"),
    ("zs", "Zs"),
    // General categories: long names
    ("other", "Other"),
    ("control", "Control"),
    ("format", "Format"),
    ("unassigned", "Unassigned"),
    ("privateuse", "Private_Use"),
    ("surrogate", "Surrogate"),
    ("letter", "Letter"),
    ("casedletter", "Cased_Letter"),
    ("lowercaseletter", "Lowercase_Letter"),
    ("modifierletter", "Modifier_Letter"),
    ("otherletter", "Other_Letter"),
    ("titlecaseletter", "Titlecase_Letter"),
    ("uppercaseletter", "Uppercase_Letter"),
    ("mark", "Mark"),
    ("combiningmark", "Combining_Mark"),
    ("spacingmark", "Spacing_Mark"),
    ("enclosingmark", "Enclosing_Mark"),
    ("nonspacingmark", "Nonspacing_Mark"),
    ("number", "Number"),
    ("decimalnumber", "Decimal_Number"),
    ("digit", "Digit"),
    ("letternumber", "Letter_Number"),
    ("othernumber", "Other_Number"),
    ("punctuation", "Punctuation"),
    ("connectorpunctuation", "Connector_Punctuation"),
    ("dashpunctuation", "Dash_Punctuation"),
    ("closepunctuation", "Close_Punctuation"),
    ("finalpunctuation", "Final_Punctuation"),
    ("initialpunctuation", "Initial_Punctuation"),
    ("otherpunctuation", "Other_Punctuation"),
    ("openpunctuation", "Open_Punctuation"),
    ("symbol", "Symbol"),
    ("currencysymbol", "Currency_Symbol"),
    ("modifiersymbol", "Modifier_Symbol"),
    ("mathsymbol", "Math_Symbol"),
    ("othersymbol", "Other_Symbol"),
    ("separator", "Separator"),
    ("linebreakseparator", "Line_Separator"),
    ("paragraphseparator", "Paragraph_Separator"),
    ("spaceseparator", "Space_Separator"),
    // Binary properties
    ("alpha", "Alpha"),
    ("alphabetic", "Alphabetic"),
    ("any", "Any"),
    ("ahex", "AHex"),
    ("asciihexdigit", "ASCII_Hex_Digit"),
    ("ascii", "ASCII"),
    ("assigned", "Assigned"),
    ("cased", "Cased"),
    ("ci", "CI"),
    ("caseignorable", "Case_Ignorable"),
    ("dash", "Dash"),
    ("dep", "Dep"),
    ("deprecated", "Deprecated"),
    ("di", "DI"),
    ("defaultignorablecodepoint", "Default_Ignorable_Code_Point"),
    ("dia", "Dia"),
    ("diacritic", "Diacritic"),
    ("emoji", "Emoji"),
    ("ext", "Ext"),
    ("extender", "Extender"),
    ("graphemebase", "Grapheme_Base"),
    ("graphemeextend", "Grapheme_Extend"),
    ("hexdigit", "Hex_Digit"),
    ("hex", "Hex"),
    ("idc", "IDC"),
    ("idcontinue", "ID_Continue"),
    ("ids", "IDS"),
    ("idstart", "ID_Start"),
    ("ideo", "Ideo"),
    ("ideographic", "Ideographic"),
    ("joinc", "Join_C"),
    ("joincontrol", "Join_Control"),
    ("lower", "Lower"),
    ("lowercase", "Lowercase"),
    ("math", "Math"),
    ("nchar", "NChar"),
    ("noncharactercodepoint", "Noncharacter_Code_Point"),
    ("patsyn", "Pat_Syn"),
    ("patternsyntax", "Pattern_Syntax"),
    ("patws", "Pat_WS"),
    ("patternwhitespace", "Pattern_White_Space"),
    ("qmark", "QMark"),
    ("quotationmark", "Quotation_Mark"),
    ("radical", "Radical"),
    ("sd", "SD"),
    ("softdotted", "Soft_Dotted"),
    ("sterm", "STerm"),
    ("term", "Term"),
    ("terminalpunctuation", "Terminal_Punctuation"),
    ("uideo", "UIdeo"),
    ("unifiedideograph", "Unified_Ideograph"),
    ("upper", "Upper"),
    ("uppercase", "Uppercase"),
    ("vs", "VS"),
    ("variationselector", "Variation_Selector"),
    ("wspace", "WSpace"),
    ("whitespace", "White_Space"),
    ("word", "Word"),
    ("xidc", "XIDC"),
    ("xidcontinue", "XID_Continue"),
    ("xids", "XIDS"),
    ("xidstart", "XID_Start"),
    // Scripts in common use
    ("arabic", "Arabic"),
    ("armenian", "Armenian"),
    ("bengali", "Bengali"),
    ("bopomofo", "Bopomofo"),
    ("cherokee", "Cherokee"),
    ("common", "Common"),
    ("cyrillic", "Cyrillic"),
    ("devanagari", "Devanagari"),
    ("ethiopic", "Ethiopic"),
    ("georgian", "Georgian"),
    ("greek", "Greek"),
    ("gujarati", "Gujarati"),
    ("gurmukhi", "Gurmukhi"),
    ("han", "Han"),
    ("hangul", "Hangul"),
    ("hebrew", "Hebrew"),
    ("hiragana", "Hiragana"),
    ("inherited", "Inherited"),
    ("kannada", "Kannada"),
    ("katakana", "Katakana"),
    ("khmer", "Khmer"),
    ("lao", "Lao"),
    ("latin", "Latin"),
    ("malayalam", "Malayalam"),
    ("mongolian", "Mongolian"),
    ("myanmar", "Myanmar"),
    ("oriya", "Oriya"),
    ("sinhala", "Sinhala"),
    ("syriac", "Syriac"),
    ("tamil", "Tamil"),
    ("telugu", "Telugu"),
    ("thaana", "Thaana"),
    ("thai", "Thai"),
    ("tibetan", "Tibetan"),
];

// (canonical long form, short alias) rows for alias substitution.
static PROPERTY_ALIASES: &[(&str, &str)] = &[
    ("Other", "C"),
    ("Letter", "L"),
    ("Mark", "M"),
    ("Number", "N"),
    ("Punctuation", "P"),
    ("Symbol", "S"),
    ("Separator", "Z"),
    ("Control", "Cc"),
    ("Format", "Cf"),
    ("Unassigned", "Cn"),
    ("Private_Use", "Co"),
    ("Surrogate", "Cs"),
    ("Cased_Letter", "LC"),
    ("Lowercase_Letter", "Ll"),
    ("Modifier_Letter", "Lm"),
    ("Other_Letter", "Lo"),
    ("Titlecase_Letter", "Lt"),
    ("Uppercase_Letter", "Lu"),
    ("Spacing_Mark", "Mc"),
    ("Enclosing_Mark", "Me"),
    ("Nonspacing_Mark", "Mn"),
    ("Combining_Mark", "M"),
    ("Decimal_Number", "Nd"),
    ("Letter_Number", "Nl"),
    ("Other_Number", "No"),
    ("Connector_Punctuation", "Pc"),
    ("Dash_Punctuation", "Pd"),
    ("Close_Punctuation", "Pe"),
    ("Final_Punctuation", "Pf"),
    ("Initial_Punctuation", "Pi"),
    ("Other_Punctuation", "Po"),
    ("Open_Punctuation", "Ps"),
    ("Currency_Symbol", "Sc"),
    ("Modifier_Symbol", "Sk"),
    ("Math_Symbol", "Sm"),
    ("Other_Symbol", "So"),
    ("Line_Separator", "Zl"),
    ("Paragraph_Separator", "Zp"),
    ("Space_Separator", "Zs"),
    ("ASCII_Hex_Digit", "AHex"),
    ("Alphabetic", "Alpha"),
    ("Case_Ignorable", "CI"),
    ("Default_Ignorable_Code_Point", "DI"),
    ("Deprecated", "Dep"),
    ("Diacritic", "Dia"),
    ("Extender", "Ext"),
    ("Hex_Digit", "Hex"),
    ("ID_Continue", "IDC"),
    ("ID_Start", "IDS"),
    ("Ideographic", "Ideo"),
    ("Join_Control", "Join_C"),
    ("Lowercase", "Lower"),
    ("Noncharacter_Code_Point", "NChar"),
    ("Pattern_Syntax", "Pat_Syn"),
    ("Pattern_White_Space", "Pat_WS"),
    ("Quotation_Mark", "QMark"),
    ("Soft_Dotted", "SD"),
    ("Terminal_Punctuation", "Term"),
    ("Unified_Ideograph", "UIdeo"),
    ("Uppercase", "Upper"),
    ("Variation_Selector", "VS"),
    ("White_Space", "WSpace"),
    ("XID_Continue", "XIDC"),
    ("XID_Start", "XIDS"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugging() {
        assert_eq!(slug("Decimal_Number"), "decimalnumber");
        assert_eq!(slug("ASCII Hex-Digit"), "asciihexdigit");
        assert_eq!(slug("Nd"), "nd");
    }

    #[test]
    fn builtin_lookup_keeps_spelling() {
        let map = PropertyMap::builtin();
        assert_eq!(map.get("nd"), Some("Nd"));
        assert_eq!(map.get("decimalnumber"), Some("Decimal_Number"));
        assert_eq!(map.get("nosuchthing"), None);
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_property_name(" foo--bar baz "), "Foo_Bar_Baz");
        assert_eq!(normalize_property_name("decimalNumber"), "Decimal_Number");
        assert_eq!(normalize_property_name("ALLCAPS"), "Allcaps");
    }

    #[test]
    fn aliases() {
        assert_eq!(property_short_alias("Decimal_Number"), Some("Nd"));
        assert_eq!(property_short_alias("White_Space"), Some("WSpace"));
        assert_eq!(property_short_alias("Nd"), None);
    }

    #[test]
    fn posix_names() {
        assert!(is_posix_class_name("xdigit"));
        assert!(!is_posix_class_name("xdigits"));
    }
}
