#![forbid(unsafe_code)]

//! Span and box styles.
//!
//! Each style is a closed variant that supplies the CSS class it adds and the
//! rule defining that class. Custom styles are inlined instead of defining a
//! class.

use crate::html::SetupContext;

/// Style applied by a styled span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpanStyle {
    /// Grey text for non-roundtrippable abbreviations.
    Abbreviation,
    /// Comment color.
    Comment,
    /// Comment color, only outside collapsed nodes.
    CommentWhenExpanded,
    /// Red text for errors and warnings.
    Error,
    /// Muted module prefix of a qualified type name.
    QualifiedTypeName,
    /// Placeholder shown while a deferred part is pending.
    DeferredPlaceholder,
    /// A CSS color value.
    TextColor(String),
    /// Arbitrary inline CSS declarations.
    Custom(String),
}

impl SpanStyle {
    /// Class added to the span, if the style defines one.
    #[must_use]
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            Self::Abbreviation => Some("color_abbreviation"),
            Self::Comment => Some("color_comment"),
            Self::CommentWhenExpanded => Some("color_comment_when_expanded"),
            Self::Error => Some("color_error"),
            Self::QualifiedTypeName => Some("qualname_prefix"),
            Self::DeferredPlaceholder => Some("deferred_placeholder"),
            Self::TextColor(_) | Self::Custom(_) => None,
        }
    }

    /// Inline `style` attribute value, for styles without a class.
    #[must_use]
    pub fn inline_css(&self) -> Option<String> {
        match self {
            Self::TextColor(color) => Some(format!("color: {};", color)),
            Self::Custom(css) => Some(css.clone()),
            _ => None,
        }
    }

    /// Rule defining [`Self::css_class`].
    #[must_use]
    pub fn css_rule(&self, ctx: &SetupContext) -> Option<String> {
        let rule = match self {
            Self::Abbreviation => ".color_abbreviation { color: #909090; }".to_string(),
            Self::Comment => {
                ".color_comment { color: #aaaaaa; } .color_comment a:not(:hover) { color: #aaaaaa; }"
                    .to_string()
            }
            Self::CommentWhenExpanded => format!(
                ".color_comment_when_expanded:not({} *) {{ color: #aaaaaa; }}",
                ctx.collapsed_selector
            ),
            Self::Error => ".color_error { color: red; }".to_string(),
            Self::QualifiedTypeName => {
                ".qualname_prefix { font-size: 0.8em; color: #808080; }".to_string()
            }
            Self::DeferredPlaceholder => {
                ".deferred_placeholder { color: #a0a0a0; font-style: italic; }".to_string()
            }
            Self::TextColor(_) | Self::Custom(_) => return None,
        };
        Some(rule)
    }
}

/// Outline drawn by an outlined box.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OutlineStyle {
    /// Light grey outline.
    #[default]
    Plain,
    /// Outline in the given CSS color.
    Colored(String),
}

impl OutlineStyle {
    /// Class added next to `box_with_outline`.
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Plain => "outline_plain",
            Self::Colored(_) => "outline_colored",
        }
    }

    /// Inline style carrying the color, if any.
    #[must_use]
    pub fn inline_css(&self) -> Option<String> {
        match self {
            Self::Plain => None,
            Self::Colored(color) => Some(format!("outline-color: {};", color)),
        }
    }

    /// Rule defining [`Self::css_class`].
    #[must_use]
    pub fn css_rule(&self) -> &'static str {
        match self {
            Self::Plain => ".outline_plain { outline: 1px solid #cccccc; }",
            Self::Colored(_) => ".outline_colored { outline: 1px solid; }",
        }
    }
}
