//! Releases, languages and URL construction for Launchpad Translations
//!
//! Every URL the engine touches is built here. Detail and Weblate URLs are
//! only ever built, never fetched.

use std::sync::OnceLock;

use regex_lite::Regex;
use url::Url;

/// Launchpad Translations root for the Ubuntu distribution
pub const LAUNCHPAD_BASE_URL: &str = "https://translations.launchpad.net/ubuntu";

/// Host serving the translation status pages
pub const LAUNCHPAD_HOST: &str = "translations.launchpad.net";

/// Hosted Weblate instance used as a secondary reference
pub const WEBLATE_BASE_URL: &str = "https://hosted.weblate.org";

/// Releases with open translations, newest first
pub const RELEASES: &[Release] = &[
    Release { codename: "resolute", version: "26.04" },
    Release { codename: "questing", version: "25.10" },
    Release { codename: "plucky", version: "25.04" },
    Release { codename: "oracular", version: "24.10" },
    Release { codename: "noble", version: "24.04 LTS" },
    Release { codename: "focal", version: "20.04 LTS" },
];

/// Commonly translated languages (code, English name)
pub const LANGUAGES: &[(&str, &str)] = &[
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("nb", "Norwegian Bokmål"),
    ("nn", "Norwegian Nynorsk"),
    ("fi", "Finnish"),
    ("de", "German"),
    ("fr", "French"),
    ("es", "Spanish"),
    ("pt_BR", "Portuguese (Brazil)"),
    ("it", "Italian"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("ru", "Russian"),
    ("uk", "Ukrainian"),
    ("zh_CN", "Chinese (Simplified)"),
    ("zh_TW", "Chinese (Traditional)"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("cs", "Czech"),
    ("hu", "Hungarian"),
    ("ro", "Romanian"),
    ("tr", "Turkish"),
    ("el", "Greek"),
    ("he", "Hebrew"),
    ("id", "Indonesian"),
    ("ca", "Catalan"),
    ("gl", "Galician"),
    ("eu", "Basque"),
    ("pt", "Portuguese"),
];

/// An Ubuntu release with open translations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release {
    pub codename: &'static str,
    pub version: &'static str,
}

impl Release {
    /// Human readable label, e.g. "Noble (24.04 LTS)"
    pub fn label(&self) -> String {
        let mut chars = self.codename.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{} ({})", capitalized, self.version)
    }
}

/// Look up a release by codename
pub fn find_release(codename: &str) -> Option<&'static Release> {
    RELEASES.iter().find(|r| r.codename == codename)
}

/// English display name for a known language code
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

fn language_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z]{2,3}(_[A-Z]{2})?(@[a-z]+)?$").expect("language code pattern is valid")
    })
}

/// Check that a language code has the shape Launchpad uses (`sv`, `pt_BR`, `ca@valencia`)
pub fn is_valid_language_code(code: &str) -> bool {
    language_code_pattern().is_match(code)
}

/// Map a system locale such as `sv_SE.UTF-8` onto a known language code
pub fn language_from_locale(locale: &str) -> Option<&'static str> {
    let locale = locale.split('.').next().unwrap_or_default();
    if let Some((code, _)) = LANGUAGES.iter().find(|(c, _)| *c == locale) {
        return Some(code);
    }
    let base = locale.split('_').next().unwrap_or_default();
    LANGUAGES.iter().find(|(c, _)| *c == base).map(|(c, _)| *c)
}

/// Language of the user's locale, from the first set of `LC_ALL`, `LC_MESSAGES`, `LANG`
pub fn system_language() -> Option<&'static str> {
    language_from_env(|key| std::env::var(key).ok())
}

fn language_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<&'static str> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(lookup)
        .find(|value| !value.is_empty())
        .and_then(|locale| language_from_locale(&locale))
}

/// Builds the URLs for one Launchpad instance
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: String,
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self::new(LAUNCHPAD_BASE_URL)
    }
}

impl UrlBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Status index page for a release and language, one batch of rows
    pub fn index_page(
        &self,
        distribution: &str,
        language: &str,
        batch: usize,
        start: usize,
    ) -> Result<Url, url::ParseError> {
        let mut raw = format!(
            "{}/{}/+lang/{}/+index?batch={}",
            self.base, distribution, language, batch
        );
        if start > 0 {
            raw.push_str(&format!("&start={}", start));
        }
        Url::parse(&raw)
    }

    /// Translate page for one package template, path segments percent-encoded
    pub fn package_detail(&self, distribution: &str, language: &str, package: &str) -> String {
        let segments = [distribution, "+source", package, "+pots", package, language, "+translate"];
        match Url::parse(&self.base) {
            Ok(mut url) => {
                if let Ok(mut path) = url.path_segments_mut() {
                    path.pop_if_empty().extend(segments);
                }
                url.into()
            }
            // Unparseable base; nothing to encode against
            Err(_) => format!("{}/{}", self.base, segments.join("/")),
        }
    }
}

/// Translate page for one package on the public Launchpad instance
pub fn package_detail_url(distribution: &str, language: &str, package: &str) -> String {
    UrlBuilder::default().package_detail(distribution, language, package)
}

/// Weblate reference page for a project in one language
pub fn weblate_project_url(project: &str, language: &str) -> String {
    format!("{}/projects/{}/-/{}/", WEBLATE_BASE_URL, project, language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_lookup_and_label() {
        let noble = find_release("noble").unwrap();
        assert_eq!(noble.version, "24.04 LTS");
        assert_eq!(noble.label(), "Noble (24.04 LTS)");
        assert!(find_release("warty").is_none());
    }

    #[test]
    fn test_index_page_url() {
        let urls = UrlBuilder::default();
        let first = urls.index_page("noble", "sv", 300, 0).unwrap();
        assert_eq!(
            first.as_str(),
            "https://translations.launchpad.net/ubuntu/noble/+lang/sv/+index?batch=300"
        );

        let next = urls.index_page("noble", "sv", 300, 600).unwrap();
        assert_eq!(next.query(), Some("batch=300&start=600"));
    }

    #[test]
    fn test_package_detail_url_is_deterministic() {
        let a = package_detail_url("noble", "sv", "firefox");
        let b = package_detail_url("noble", "sv", "firefox");
        assert_eq!(a, b);
        assert_eq!(
            a,
            "https://translations.launchpad.net/ubuntu/noble/+source/firefox/+pots/firefox/sv/+translate"
        );
    }

    #[test]
    fn test_package_detail_url_encodes_names() {
        let url = package_detail_url("noble", "sv", "odd name#1");
        assert_eq!(
            url,
            "https://translations.launchpad.net/ubuntu/noble/+source/odd%20name%231/+pots/odd%20name%231/sv/+translate"
        );

        let trailing = UrlBuilder::new("http://127.0.0.1:8080/ubuntu/");
        assert_eq!(
            trailing.package_detail("noble", "ca@valencia", "gedit"),
            "http://127.0.0.1:8080/ubuntu/noble/+source/gedit/+pots/gedit/ca@valencia/+translate"
        );
    }

    #[test]
    fn test_language_codes() {
        assert!(is_valid_language_code("sv"));
        assert!(is_valid_language_code("pt_BR"));
        assert!(is_valid_language_code("ca@valencia"));
        assert!(is_valid_language_code("ast"));
        assert!(!is_valid_language_code("SV"));
        assert!(!is_valid_language_code("sv/../x"));
        assert!(!is_valid_language_code(""));
    }

    #[test]
    fn test_language_from_locale() {
        assert_eq!(language_from_locale("sv_SE.UTF-8"), Some("sv"));
        assert_eq!(language_from_locale("pt_BR"), Some("pt_BR"));
        assert_eq!(language_from_locale("xx_YY"), None);
        assert_eq!(language_name("fi"), Some("Finnish"));
    }

    #[test]
    fn test_language_from_env_precedence() {
        use std::collections::HashMap;

        let env = |pairs: &[(&str, &str)]| -> HashMap<String, String> {
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };
        let lookup = |vars: HashMap<String, String>| move |key: &str| vars.get(key).cloned();

        let all = env(&[("LC_ALL", "fi_FI.UTF-8"), ("LANG", "sv_SE.UTF-8")]);
        assert_eq!(language_from_env(lookup(all)), Some("fi"));

        let empty_lc_all = env(&[("LC_ALL", ""), ("LANG", "pt_BR.UTF-8")]);
        assert_eq!(language_from_env(lookup(empty_lc_all)), Some("pt_BR"));

        let posix = env(&[("LANG", "C.UTF-8")]);
        assert_eq!(language_from_env(lookup(posix)), None);
        assert_eq!(language_from_env(lookup(HashMap::new())), None);
    }

    #[test]
    fn test_weblate_project_url() {
        assert_eq!(
            weblate_project_url("ubuntu-l10n", "pt_BR"),
            "https://hosted.weblate.org/projects/ubuntu-l10n/-/pt_BR/"
        );
    }
}
