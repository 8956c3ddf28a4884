use serde::Serialize;

/// The player catalog served to the mobile UI shell. Seeded in code for
/// now; the episode pipeline that will feed it is out of band.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub creator_name: String,
    pub cover_image: String,
    pub description: String,
    pub is_subscribed: bool,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub published_at: String,
    pub published_at_relative: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub ai_summary: String,
    pub original_url: String,
    pub progress: u8,
}

pub fn built_in() -> Vec<Channel> {
    vec![Channel {
        id: "channel-1".to_string(),
        name: "The Operator's Notebook".to_string(),
        creator_name: "Ada Moreno".to_string(),
        cover_image: "/covers/operators-notebook.jpg".to_string(),
        description: "Weekly deep dives on product, growth, and the craft of running things well."
            .to_string(),
        is_subscribed: false,
        episodes: vec![
            Episode {
                id: "ep-01".to_string(),
                title: "Finding the problems actually worth solving".to_string(),
                published_at: "Aug 24".to_string(),
                published_at_relative: "6 days ago".to_string(),
                cover_image: Some("/covers/ep-01.png".to_string()),
                audio_url: None,
                ai_summary: "How to separate loud problems from important ones, validate demand \
                             cheaply, and decide what to build next."
                    .to_string(),
                original_url: "https://example.com/operators/ep-01".to_string(),
                progress: 0,
            },
            Episode {
                id: "ep-02".to_string(),
                title: "Growth loops that compound without paid spend".to_string(),
                published_at: "Aug 21".to_string(),
                published_at_relative: "1 week ago".to_string(),
                cover_image: Some("/covers/ep-02.png".to_string()),
                audio_url: None,
                ai_summary: "Designing and measuring loops that turn user activity into new \
                             acquisition."
                    .to_string(),
                original_url: "https://example.com/operators/ep-02".to_string(),
                progress: 12,
            },
            Episode {
                id: "ep-03".to_string(),
                title: "Pricing: how to charge what the work is worth".to_string(),
                published_at: "Aug 17".to_string(),
                published_at_relative: "2 weeks ago".to_string(),
                cover_image: None,
                audio_url: None,
                ai_summary: "Choosing a value metric, packaging tiers, and iterating on price \
                             without churn spikes."
                    .to_string(),
                original_url: "https://example.com/operators/ep-03".to_string(),
                progress: 36,
            },
        ],
    }]
}
