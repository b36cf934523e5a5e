/// A single field on a card, rendered in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl CardField {
    pub fn new(name: impl Into<String>, value: impl ToString, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
            inline,
        }
    }
}

/// A structured card message (title, description, colored accent, fields)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<CardField>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub footer: Option<String>,
}

impl Card {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            author: None,
            url: None,
            image: None,
            footer: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl ToString, inline: bool) -> Self {
        self.fields.push(CardField::new(name, value, inline));
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// One renderable outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayUnit {
    Text(String),
    Card(Card),
}

impl DisplayUnit {
    pub fn text(text: impl Into<String>) -> Self {
        DisplayUnit::Text(text.into())
    }
}

/// Where a handler's response goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTarget {
    /// The channel the command came from
    Channel,
    /// A private message to the invoking user
    Direct,
}

/// A handler's complete response: ordered units plus a destination.
///
/// Units must be sent in order; later units may continue text started
/// in an earlier one.
#[derive(Debug, Clone)]
pub struct Reply {
    pub units: Vec<DisplayUnit>,
    pub target: ReplyTarget,
}

impl Reply {
    pub fn channel(units: Vec<DisplayUnit>) -> Self {
        Self {
            units,
            target: ReplyTarget::Channel,
        }
    }

    pub fn direct(units: Vec<DisplayUnit>) -> Self {
        Self {
            units,
            target: ReplyTarget::Direct,
        }
    }

    pub fn channel_text(text: impl Into<String>) -> Self {
        Self::channel(vec![DisplayUnit::text(text)])
    }
}
