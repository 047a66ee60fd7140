use dramapop::models::{CdnSource, Drama, DramaId, Episode, VideoVariant};

pub fn drama(id: &str, total_episodes: u32) -> Drama {
    Drama {
        id: DramaId::new(id),
        title: format!("Drama {id}"),
        cover: Some(format!("https://img.example/{id}.jpg")),
        tags: vec!["Romance".to_string()],
        total_episodes,
        view_count: 1000,
        synopsis: None,
    }
}

/// Two CDNs; the second is the default and offers 1080/720/540
pub fn episode_with_sources(drama_id: &str, index: u32) -> Episode {
    Episode {
        drama_id: DramaId::new(drama_id),
        index,
        name: format!("EP {index}"),
        thumbnail: None,
        cdn_sources: vec![
            CdnSource {
                domain: "cdn-a.example".to_string(),
                is_default: false,
                variants: vec![VideoVariant::new(
                    720,
                    format!("https://cdn-a.example/{drama_id}/{index}/720.m3u8"),
                    true,
                )],
            },
            CdnSource {
                domain: "cdn-b.example".to_string(),
                is_default: true,
                variants: vec![
                    VideoVariant::new(
                        1080,
                        format!("https://cdn-b.example/{drama_id}/{index}/1080.m3u8"),
                        false,
                    ),
                    VideoVariant::new(
                        720,
                        format!("https://cdn-b.example/{drama_id}/{index}/720.m3u8"),
                        true,
                    ),
                    VideoVariant::new(
                        540,
                        format!("https://cdn-b.example/{drama_id}/{index}/540.m3u8"),
                        false,
                    ),
                ],
            },
        ],
    }
}

pub fn url_for(drama_id: &str, index: u32) -> String {
    format!("https://cdn-b.example/{drama_id}/{index}/720.m3u8")
}
