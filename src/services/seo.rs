use askama::Template;

const DEFAULT_TITLE: &str = "Ivana Jiráková | Podnikatelka & Mentorka";
const DEFAULT_DESCRIPTION: &str = "Jmenuji se Ivana Jiráková, jsem podnikatelka, mentorka a průvodkyně na cestě k finanční svobodě. Podnikám v oblasti přímého prodeje, kde působím jako TOP 1.";
const KEYWORDS: &str = "Ivana Jiráková, Jiráková, podnikatelka, mentorka, finanční svoboda, přímý prodej, TOP 1, osobní rozvoj, podnikání, finanční nezávislost, osobní růst, business mentor, podnikatelské poradenství, FARMASI, FARMASI podnikání, FARMASI business, FARMASI mentoring, FARMASI poradenství, FARMASI registrace, FARMASI ambasadorka, přímý prodej poradenství";
const SITE_NAME: &str = "Ivana Jiráková";

#[derive(Debug, Clone)]
pub struct SeoMeta {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: String,
}

impl SeoMeta {
    /// Landing page defaults rooted at `site_url`.
    pub fn for_site(site_url: &str) -> Self {
        let root = site_url.trim_end_matches('/');
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            url: format!("{root}/"),
            image: format!("{root}/og-image.jpg"),
        }
    }
}

fn structured_data(meta: &SeoMeta) -> String {
    let root = meta.url.trim_end_matches('/');
    let person = serde_json::json!({
        "@context": "https://schema.org",
        "@type": "Person",
        "name": SITE_NAME,
        "url": meta.url,
        "logo": format!("{root}/logo.png"),
        "image": meta.image,
        "jobTitle": "Podnikatelka & Mentorka",
        "description": meta.description,
        "address": {
            "@type": "PostalAddress",
            "addressLocality": "Praha",
            "addressCountry": "CZ"
        },
        "sameAs": [
            "https://www.instagram.com/jirakova_iva",
            "https://www.facebook.com/jirakovaiva",
            "https://www.linkedin.com/in/jirakovaiva"
        ],
        "knowsAbout": [
            "Podnikání",
            "FARMASI business",
            "Finanční svoboda",
            "Osobní rozvoj",
            "Mentoring",
            "Přímý prodej"
        ],
        "award": "TOP 1 v přímém prodeji"
    });
    // A literal "</script>" inside a string would end the element early.
    person.to_string().replace("</", "<\\/")
}

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingPage<'a> {
    meta: &'a SeoMeta,
    keywords: &'a str,
    site_name: &'a str,
    structured_data: String,
}

/// Landing shell with the full SEO head; the client bundle mounts into `#root`.
pub fn render_page(meta: &SeoMeta) -> askama::Result<String> {
    LandingPage {
        meta,
        keywords: KEYWORDS,
        site_name: SITE_NAME,
        structured_data: structured_data(meta),
    }
    .render()
}
