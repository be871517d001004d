//! Round prompts ("categories").
//!
//! Two call sites pick a category: starting a game and advancing to the
//! next round. They draw from two different built-in catalogs, and
//! [`Categories`] keeps them as two separate providers so neither list
//! silently absorbs the other.

use std::sync::Arc;

use rand::Rng;

/// Supplies the category for a new round.
pub trait CategoryProvider: Send + Sync + 'static {
    fn next(&self) -> String;
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A fixed, non-empty list of category names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catalog {
    name: &'static str,
    entries: &'static [&'static str],
}

impl Catalog {
    /// Drawn from when a game starts.
    pub const GAME_START: Catalog = Catalog {
        name: "game-start",
        entries: &[
            "Bücher",
            "Musikalben",
            "Songtexte",
            "Reimwörter",
            "Lügen",
            "Träume",
            "Peinliche Situationen",
            "Kinderserien",
            "Tanzarten",
            "Uhrenmarken",
            "Parfümmarken",
            "Fast-Food-Ketten",
            "Spielzeug",
            "Haarschnitte",
            "Süßspeisen",
            "Gewürze",
            "Kulturen",
            "Religionen",
            "Bücherfiguren",
            "Gefährliche Orte",
            "Filmwaffen",
            "Detektive",
            "Tatorte",
            "Kriminalfälle",
            "Modeaccessoires",
            "Verkehrsunfälle",
            "Bewegungsverben",
            "Feste & Feiertage",
            "Typisch deutsch",
            "Typisch amerikanisch",
            "Typisch asiatisch",
            "Typisch französisch",
            "Schulnoten-Gründe",
            "Sprüche von Eltern",
            "Berühmte Paare",
            "Lügengeschichten",
            "Wahrheiten, die wehtun",
            "Versicherungen",
            "Küchengeräte",
            "Wörter aus der Werbung",
            "TV-Werbeslogans",
            "Pseudonyme",
            "Hackernamen",
            "Slangbegriffe",
            "Jugendwörter",
            "Spitznamen",
            "Kosename für Partner",
            "Letzte Worte",
            "Szenarien bei Apokalypse",
            "Bösewichtnamen",
            "Wissenschaftler*innen",
            "Historische Figuren",
            "Wichtige Jahreszahlen",
            "Sprengstoffe",
            "Todesursachen",
            "Seltsame Hobbys",
            "Wünsche",
            "Ängste",
            "Künstlernamen",
            "Götter & Göttinnen",
            "Fantasy-Rassen",
            "Magische Gegenstände",
            "Krankenkassen",
            "Verkehrsregeln",
            "Sinnlose Dinge",
            "Berühmte Reden",
            "Böse Berufe",
            "Alienspezies",
            "Lustige Orte",
            "Nervige Dinge",
            "Berühmte Brücken",
            "Flüsse",
            "Seen",
            "Extremtemperaturen",
            "TV-Wettermoderatoren",
            "Sachen, die man nicht vergisst",
            "Unnützes Wissen",
            "Sachen, die man im Internet findet",
            "Typische Fragen im Bewerbungsgespräch",
            "Dinge, die Lehrer sagen",
            "Unerklärliche Dinge",
            "Kuriose Berufe",
            "Berühmte Redensarten",
        ],
    };

    /// Drawn from when the host advances to the next round.
    pub const ROUND_ADVANCE: Catalog = Catalog {
        name: "round-advance",
        entries: &[
            "Essen",
            "Tiere",
            "Farben",
            "Länder",
            "Berufe",
            "Sport",
            "Musik",
            "Filme",
            "Kleidung",
            "Wetter",
            "Transport",
            "Hobbys",
            "Körperteile",
            "Möbel",
            "Getränke",
            "Früchte",
            "Gemüse",
            "Werkzeuge",
            "Elektronik",
            "Natur",
            "Schule",
            "Küche",
            "Badezimmer",
            "Garten",
            "Auto",
            "Computer",
            "Handy",
            "Büro",
            "Restaurant",
            "Supermarkt",
            "Krankenhaus",
            "Bank",
            "Post",
        ],
    };

    /// Builds a custom catalog. Returns `None` for an empty list.
    pub const fn new(
        name: &'static str,
        entries: &'static [&'static str],
    ) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { name, entries })
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn entries(&self) -> &'static [&'static str] {
        self.entries
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.contains(&category)
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Uniformly random pick from a [`Catalog`].
#[derive(Debug, Clone, Copy)]
pub struct RandomCategories {
    catalog: Catalog,
}

impl RandomCategories {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

impl CategoryProvider for RandomCategories {
    fn next(&self) -> String {
        // Catalogs are non-empty by construction.
        let index = rand::rng().random_range(0..self.catalog.entries.len());
        let category = self.catalog.entries[index];
        tracing::trace!(catalog = self.catalog.name(), category, "picked category");
        category.to_string()
    }
}

/// Always returns the same category. Handy for deterministic tests and
/// scripted demos.
#[derive(Debug, Clone)]
pub struct FixedCategory(pub String);

impl CategoryProvider for FixedCategory {
    fn next(&self) -> String {
        self.0.clone()
    }
}

/// The pair of providers a lobby draws from.
#[derive(Clone)]
pub struct Categories {
    /// Used by `start`.
    pub start: Arc<dyn CategoryProvider>,
    /// Used by `next_round`.
    pub advance: Arc<dyn CategoryProvider>,
}

impl Categories {
    /// Two fixed categories, one per call site.
    pub fn fixed(start: &str, advance: &str) -> Self {
        Self {
            start: Arc::new(FixedCategory(start.to_string())),
            advance: Arc::new(FixedCategory(advance.to_string())),
        }
    }
}

impl Default for Categories {
    fn default() -> Self {
        Self {
            start: Arc::new(RandomCategories::new(Catalog::GAME_START)),
            advance: Arc::new(RandomCategories::new(Catalog::ROUND_ADVANCE)),
        }
    }
}
