use ubuntu_l10n::catalog::{LANGUAGES, RELEASES};

pub fn list_releases() {
    for release in RELEASES {
        println!("{:<10} {}", release.codename, release.label());
    }
}

pub fn list_languages() {
    for (code, name) in LANGUAGES {
        println!("{:<12} {}", code, name);
    }
}
