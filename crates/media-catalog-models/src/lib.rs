pub mod category;
pub mod episode;
pub mod genre;
pub mod people;
pub mod search;
pub mod season;
pub mod show;
pub mod video;

pub use category::Category;
pub use episode::Episode;
pub use genre::Genre;
pub use people::People;
pub use search::SearchItem;
pub use season::Season;
pub use show::{Movie, Show, TvShow};
pub use video::{Server, Subtitle, Video, VideoFormat, VideoType};
