use std::collections::HashMap;

/// A bundled translation
#[derive(PartialEq, Eq, Clone)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub translation: &'static str,
    pub native_name: &'static str,
}

/// Translations shipped with the bundle, keyed by language code.
pub fn supported_languages() -> HashMap<&'static str, LanguageInfo> {
    HashMap::from([(
        "en",
        LanguageInfo {
            code: "en",
            translation: include_str!("../translations/en.json"),
            native_name: "English",
        },
    )])
}
