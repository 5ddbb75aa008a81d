//! Section renderer: one template per section type.

use askama::Template;
use chrono::NaiveDate;

use crate::{
    domain::{Announcement, Event, GalleryImage, Section, SponsorGroup},
    web::templates::paragraphs,
};

/// Data the data-bound sections draw from. Only loaded when a page has a
/// section that needs it.
#[derive(Default)]
pub struct SectionData {
    pub events: Vec<Event>,
    pub sponsor_groups: Vec<SponsorGroup>,
    pub announcements: Vec<Announcement>,
    pub base_path: String,
    pub today: Option<NaiveDate>,
}

#[derive(Template)]
#[template(path = "sections/hero.html")]
struct HeroSection<'a> {
    heading: &'a str,
    subheading: Option<&'a str>,
    image_url: Option<&'a str>,
    cta: Option<CtaLink<'a>>,
}

struct CtaLink<'a> {
    label: &'a str,
    href: String,
}

#[derive(Template)]
#[template(path = "sections/text.html")]
struct TextSection<'a> {
    heading: Option<&'a str>,
    paragraphs: Vec<String>,
}

#[derive(Template)]
#[template(path = "sections/image.html")]
struct ImageSection<'a> {
    url: &'a str,
    alt: &'a str,
    caption: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "sections/gallery.html")]
struct GallerySection<'a> {
    heading: Option<&'a str>,
    images: &'a [GalleryImage],
}

#[derive(Template)]
#[template(path = "sections/cta.html")]
struct CtaSection<'a> {
    heading: &'a str,
    body: Option<&'a str>,
    label: &'a str,
    href: String,
}

#[derive(Template)]
#[template(path = "sections/event_list.html")]
struct EventListSection<'a> {
    heading: &'a str,
    events: Vec<&'a Event>,
    base_path: &'a str,
}

#[derive(Template)]
#[template(path = "sections/sponsor_grid.html")]
struct SponsorGridSection<'a> {
    heading: &'a str,
    groups: &'a [SponsorGroup],
    base_path: &'a str,
}

#[derive(Template)]
#[template(path = "sections/announcements.html")]
struct AnnouncementsSection<'a> {
    heading: &'a str,
    announcements: &'a [Announcement],
}

/// Resolve a CMS link: site-relative paths get the base path, anything else
/// (external URLs, anchors, mailto:) is used as given.
pub fn resolve_href(href: &str, base_path: &str) -> String {
    if href.starts_with('/') && !href.starts_with("//") {
        format!("{}{}", base_path, href)
    } else {
        href.to_string()
    }
}

/// Render one section. Unknown section types render nothing.
pub fn render_section(section: &Section, data: &SectionData) -> askama::Result<Option<String>> {
    let base_path = data.base_path.as_str();

    let html = match section {
        Section::Hero { heading, subheading, image_url, cta_label, cta_href } => HeroSection {
            heading,
            subheading: subheading.as_deref(),
            image_url: image_url.as_deref(),
            cta: match (cta_label, cta_href) {
                (Some(label), Some(href)) => Some(CtaLink {
                    label: label.as_str(),
                    href: resolve_href(href, base_path),
                }),
                _ => None,
            },
        }
        .render()?,
        Section::Text { heading, body } => TextSection {
            heading: heading.as_deref(),
            paragraphs: paragraphs(body),
        }
        .render()?,
        Section::Image { url, alt, caption } => ImageSection {
            url,
            alt: alt.as_deref().or(caption.as_deref()).unwrap_or(""),
            caption: caption.as_deref(),
        }
        .render()?,
        Section::Gallery { heading, images } => GallerySection {
            heading: heading.as_deref(),
            images,
        }
        .render()?,
        Section::Cta { heading, body, label, href } => CtaSection {
            heading,
            body: body.as_deref(),
            label,
            href: resolve_href(href, base_path),
        }
        .render()?,
        Section::EventList { heading, limit, featured_only } => {
            let events = data
                .events
                .iter()
                .filter(|e| data.today.map_or(true, |today| !e.is_past(today)))
                .filter(|e| !*featured_only || e.featured)
                .take(limit.unwrap_or(usize::MAX))
                .collect();
            EventListSection {
                heading: heading.as_deref().unwrap_or("Upcoming Events"),
                events,
                base_path,
            }
            .render()?
        }
        Section::SponsorGrid { heading } => SponsorGridSection {
            heading: heading.as_deref().unwrap_or("Our Sponsors"),
            groups: &data.sponsor_groups,
            base_path,
        }
        .render()?,
        Section::Announcements { heading } => AnnouncementsSection {
            heading: heading.as_deref().unwrap_or("Announcements"),
            announcements: &data.announcements,
        }
        .render()?,
        Section::Unknown => {
            tracing::debug!("Skipping section of unknown type");
            return Ok(None);
        }
    };

    Ok(Some(html))
}

/// Render every section in list order.
pub fn render_sections(sections: &[Section], data: &SectionData) -> askama::Result<Vec<String>> {
    let mut rendered = Vec::with_capacity(sections.len());
    for section in sections {
        if let Some(html) = render_section(section, data)? {
            rendered.push(html);
        }
    }
    Ok(rendered)
}
