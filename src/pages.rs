//! Fixed informational pages. Dispatch goes through an explicit enum
//! instead of trying template names at runtime, so an unknown slug is a
//! typed not-found rather than a render error.

use axum::response::{Html, IntoResponse, Response};

use crate::{include_res, AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticPage {
    About,
    Terms,
    Contacts,
}

impl StaticPage {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "about" => Some(Self::About),
            "terms" => Some(Self::Terms),
            "contacts" => Some(Self::Contacts),
            _ => None,
        }
    }

    pub fn html(self) -> &'static str {
        match self {
            Self::About => include_res!(str, "/pages/about.html"),
            Self::Terms => include_res!(str, "/pages/terms.html"),
            Self::Contacts => include_res!(str, "/pages/contacts.html"),
        }
    }
}

pub fn render(slug: &str) -> AppResult<Response> {
    let page = StaticPage::from_slug(slug).ok_or(AppError::NotFound)?;
    Ok(Html(page.html()).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_slugs_resolve() {
        assert_eq!(StaticPage::from_slug("about"), Some(StaticPage::About));
        assert_eq!(StaticPage::from_slug("terms"), Some(StaticPage::Terms));
    }

    #[test]
    fn unknown_slug_is_none() {
        assert_eq!(StaticPage::from_slug("notaurl"), None);
    }
}
