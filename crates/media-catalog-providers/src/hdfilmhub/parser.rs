use media_catalog_models::{
    Category, Episode, Genre, Movie, People, Season, Show, TvShow,
};
use scraper::{ElementRef, Html, Selector};

use crate::error::ProviderError;
use crate::util::{clean_text, parse_rating};

fn sel(css: &str) -> Result<Selector, ProviderError> {
    Selector::parse(css).map_err(|e| ProviderError::parse(e.to_string()))
}

/// One `.flw-item` poster card, shared by home sections, search results,
/// catalog and genre pages.
fn parse_card(item: ElementRef<'_>) -> Option<Show> {
    let name_sel = Selector::parse(".film-name a").ok()?;
    let poster_sel = Selector::parse(".film-poster img").ok()?;
    let info_sel = Selector::parse(".fd-infor .fdi-item").ok()?;

    let link = item.select(&name_sel).next()?;
    let href = link.value().attr("href")?;
    let id = href.trim_start_matches('/').to_string();
    let title = link
        .value()
        .attr("title")
        .map(|t| t.to_string())
        .unwrap_or_else(|| clean_text(&link.text().collect::<String>()));
    if title.is_empty() {
        return None;
    }

    let poster = item
        .select(&poster_sel)
        .next()
        .and_then(|img| img.value().attr("data-src").or_else(|| img.value().attr("src")))
        .map(|s| s.to_string());

    let quality = item
        .select(&info_sel)
        .map(|i| clean_text(&i.text().collect::<String>()))
        .find(|t| matches!(t.as_str(), "HD" | "SD" | "CAM" | "TS"));

    if href.starts_with("/tv/") {
        let mut show = TvShow::new(id, title);
        show.poster = poster;
        show.quality = quality;
        Some(Show::Tv(show))
    } else {
        let mut movie = Movie::new(id, title);
        movie.poster = poster;
        movie.quality = quality;
        Some(Show::Movie(movie))
    }
}

fn parse_cards(root: ElementRef<'_>) -> Result<Vec<Show>, ProviderError> {
    let item_sel = sel(".flw-item")?;
    Ok(root.select(&item_sel).filter_map(parse_card).collect())
}

/// Landing page: hero slider first (as the reserved featured row), then
/// each listing block in page order. Blocks that parse to nothing are
/// skipped here so callers never see empty rows.
pub fn parse_home(html: &str) -> Result<Vec<Category>, ProviderError> {
    let document = Html::parse_document(html);
    let slide_sel = sel("#slider .swiper-slide")?;
    let slide_link_sel = sel(".slide-caption h3 a")?;
    let slide_desc_sel = sel(".slide-caption .sc-desc")?;
    let slide_poster_sel = sel(".slide-photo img")?;
    let section_sel = sel("section.block_area")?;
    let heading_sel = sel("h2.cat-heading")?;

    let mut categories = Vec::new();

    let mut featured = Vec::new();
    for slide in document.select(&slide_sel) {
        let Some(link) = slide.select(&slide_link_sel).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let id = href.trim_start_matches('/').to_string();
        let title = clean_text(&link.text().collect::<String>());
        if title.is_empty() {
            continue;
        }
        let overview = slide
            .select(&slide_desc_sel)
            .next()
            .map(|d| clean_text(&d.text().collect::<String>()));
        let banner = slide
            .select(&slide_poster_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|s| s.to_string());

        if href.starts_with("/tv/") {
            let mut show = TvShow::new(id, title);
            show.overview = overview;
            show.banner = banner;
            featured.push(Show::Tv(show));
        } else {
            let mut movie = Movie::new(id, title);
            movie.overview = overview;
            movie.banner = banner;
            featured.push(Show::Movie(movie));
        }
    }
    if !featured.is_empty() {
        categories.push(Category::featured(featured));
    }

    for section in document.select(&section_sel) {
        let name = section
            .select(&heading_sel)
            .next()
            .map(|h| clean_text(&h.text().collect::<String>()))
            .unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let shows = parse_cards(section)?;
        if shows.is_empty() {
            continue;
        }
        categories.push(Category::new(name, shows));
    }

    Ok(categories)
}

pub fn parse_listing(html: &str) -> Result<Vec<Show>, ProviderError> {
    let document = Html::parse_document(html);
    parse_cards(document.root_element())
}

/// Genre links from the header dropdown, used for blank-query search.
pub fn parse_genres(html: &str) -> Result<Vec<Genre>, ProviderError> {
    let document = Html::parse_document(html);
    let link_sel = sel("#header_menu a[href^=\"/genre/\"]")?;

    let mut genres = Vec::new();
    for link in document.select(&link_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let id = href.trim_start_matches("/genre/").to_string();
        let name = clean_text(&link.text().collect::<String>());
        if id.is_empty() || name.is_empty() {
            continue;
        }
        genres.push(Genre::new(id, name));
    }
    Ok(genres)
}

struct DetailCommon {
    title: String,
    overview: Option<String>,
    poster: Option<String>,
    rating: Option<f64>,
    released: Option<chrono::NaiveDate>,
    runtime: Option<u32>,
    quality: Option<String>,
    genres: Vec<Genre>,
    cast: Vec<People>,
    recommendations: Vec<Show>,
}

fn parse_detail_common(document: &Html) -> Result<DetailCommon, ProviderError> {
    let title_sel = sel(".detail_page-infor h2.heading-name a")?;
    let desc_sel = sel(".detail_page-infor .description")?;
    let poster_sel = sel(".detail_page-infor .film-poster img")?;
    let rating_sel = sel(".detail_page-infor .btn-imdb")?;
    let quality_sel = sel(".detail_page-infor .btn-quality")?;
    let row_sel = sel(".elements .row-line")?;
    let label_sel = sel(".type strong")?;
    let anchor_sel = sel("a")?;
    let related_sel = sel(".film_related")?;

    let title = document
        .select(&title_sel)
        .next()
        .map(|t| clean_text(&t.text().collect::<String>()))
        .ok_or_else(|| ProviderError::parse("detail page has no title"))?;

    let overview = document
        .select(&desc_sel)
        .next()
        .map(|d| clean_text(&d.text().collect::<String>()))
        .filter(|d| !d.is_empty());

    let poster = document
        .select(&poster_sel)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|s| s.to_string());

    let rating = document
        .select(&rating_sel)
        .next()
        .and_then(|b| parse_rating(b.text().collect::<String>().trim_start_matches("IMDB:").trim()));

    let quality = document
        .select(&quality_sel)
        .next()
        .map(|q| clean_text(&q.text().collect::<String>()))
        .filter(|q| !q.is_empty());

    let mut released = None;
    let mut runtime = None;
    let mut genres = Vec::new();
    let mut cast = Vec::new();

    for row in document.select(&row_sel) {
        let label = row
            .select(&label_sel)
            .next()
            .map(|l| clean_text(&l.text().collect::<String>()))
            .unwrap_or_default();

        match label.as_str() {
            "Released:" => {
                let text = clean_text(&row.text().collect::<String>());
                let value = text.trim_start_matches("Released:").trim();
                released = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
            }
            "Duration:" => {
                let text = clean_text(&row.text().collect::<String>());
                runtime = text
                    .trim_start_matches("Duration:")
                    .trim()
                    .trim_end_matches("min")
                    .trim()
                    .parse::<u32>()
                    .ok();
            }
            "Genre:" => {
                for a in row.select(&anchor_sel) {
                    let Some(href) = a.value().attr("href") else {
                        continue;
                    };
                    if !href.starts_with("/genre/") {
                        continue;
                    }
                    let id = href.trim_start_matches("/genre/").to_string();
                    let name = clean_text(&a.text().collect::<String>());
                    if !name.is_empty() {
                        genres.push(Genre::new(id, name));
                    }
                }
            }
            "Casts:" => {
                for a in row.select(&anchor_sel) {
                    let Some(href) = a.value().attr("href") else {
                        continue;
                    };
                    if !href.starts_with("/cast/") {
                        continue;
                    }
                    let id = href.trim_start_matches("/cast/").to_string();
                    let name = clean_text(&a.text().collect::<String>());
                    if !name.is_empty() {
                        cast.push(People::new(id, name));
                    }
                }
            }
            _ => {}
        }
    }

    let recommendations = match document.select(&related_sel).next() {
        Some(related) => parse_cards(related)?,
        None => Vec::new(),
    };

    Ok(DetailCommon {
        title,
        overview,
        poster,
        rating,
        released,
        runtime,
        quality,
        genres,
        cast,
        recommendations,
    })
}

pub fn parse_movie_detail(html: &str, id: &str) -> Result<Movie, ProviderError> {
    let document = Html::parse_document(html);
    let common = parse_detail_common(&document)?;

    let mut movie = Movie::new(id, common.title);
    movie.overview = common.overview;
    movie.poster = common.poster;
    movie.rating = common.rating;
    movie.released = common.released;
    movie.runtime = common.runtime;
    movie.quality = common.quality;
    movie.genres = common.genres;
    movie.cast = common.cast;
    movie.recommendations = common.recommendations;
    Ok(movie)
}

pub fn parse_tv_detail(html: &str, id: &str) -> Result<TvShow, ProviderError> {
    let document = Html::parse_document(html);
    let common = parse_detail_common(&document)?;

    let mut show = TvShow::new(id, common.title);
    show.overview = common.overview;
    show.poster = common.poster;
    show.rating = common.rating;
    show.released = common.released;
    show.quality = common.quality;
    show.genres = common.genres;
    show.cast = common.cast;
    show.recommendations = common.recommendations;
    Ok(show)
}

/// AJAX season dropdown: `<a class="dropdown-item" data-id="128">Season 2</a>`
pub fn parse_seasons(html: &str) -> Result<Vec<Season>, ProviderError> {
    let fragment = Html::parse_fragment(html);
    let item_sel = sel("a.dropdown-item")?;

    let mut seasons = Vec::new();
    for item in fragment.select(&item_sel) {
        let Some(id) = item.value().attr("data-id") else {
            continue;
        };
        let text = clean_text(&item.text().collect::<String>());
        let number = text
            .trim_start_matches("Season")
            .trim()
            .parse::<u32>()
            .unwrap_or(seasons.len() as u32 + 1);
        let mut season = Season::new(id, number);
        season.title = Some(text);
        seasons.push(season);
    }
    Ok(seasons)
}

/// AJAX episode strip: `.eps-item` with data-id, poster and an
/// "Eps 3: The Bell" title attribute.
pub fn parse_episodes(html: &str) -> Result<Vec<Episode>, ProviderError> {
    let fragment = Html::parse_fragment(html);
    let item_sel = sel(".eps-item")?;
    let img_sel = sel("img")?;
    let name_sel = sel(".film-name a")?;

    let mut episodes = Vec::new();
    for item in fragment.select(&item_sel) {
        let Some(id) = item.value().attr("data-id") else {
            continue;
        };
        let raw_title = item
            .select(&name_sel)
            .next()
            .and_then(|a| a.value().attr("title"))
            .map(|t| t.to_string())
            .unwrap_or_default();

        // "Eps 3: The Bell" -> (3, "The Bell")
        let (number, title) = match raw_title.strip_prefix("Eps ") {
            Some(rest) => {
                let mut parts = rest.splitn(2, ':');
                let number = parts
                    .next()
                    .and_then(|n| n.trim().parse::<u32>().ok())
                    .unwrap_or(episodes.len() as u32 + 1);
                let title = parts.next().map(|t| clean_text(t)).filter(|t| !t.is_empty());
                (number, title)
            }
            None => (episodes.len() as u32 + 1, Some(raw_title).filter(|t| !t.is_empty())),
        };

        let poster = item
            .select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("data-src").or_else(|| img.value().attr("src")))
            .map(|s| s.to_string());

        let mut episode = Episode::new(id, number);
        episode.title = title;
        episode.poster = poster;
        episodes.push(episode);
    }
    Ok(episodes)
}

/// AJAX server strip: `.link-item` with a data-id and a display label.
pub fn parse_servers(html: &str) -> Result<Vec<(String, String)>, ProviderError> {
    let fragment = Html::parse_fragment(html);
    let item_sel = sel(".link-item")?;
    let name_sel = sel("span")?;

    let mut servers = Vec::new();
    for item in fragment.select(&item_sel) {
        let Some(id) = item.value().attr("data-id") else {
            continue;
        };
        let name = item
            .select(&name_sel)
            .next()
            .map(|s| clean_text(&s.text().collect::<String>()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("Server {}", servers.len() + 1));
        servers.push((id.to_string(), name));
    }
    Ok(servers)
}
