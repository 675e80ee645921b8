use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{
    Client,
    header::{AUTHORIZATION, COOKIE, HeaderMap, HeaderValue, ORIGIN},
};
use serde_json::{Map, Value, json};
use sha1::{Digest, Sha1};

use crate::clients::{
    entities::{Artist, Playlist, PlaylistSummary, Track},
    errors::{Error, Result},
    service::MusicService,
};

const YTM_DOMAIN: &str = "https://music.youtube.com";
const YTM_API_URL: &str = "https://music.youtube.com/youtubei/v1/";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
const DEFAULT_CLIENT_VERSION: &str = "1.20241016.01.00";
const LIBRARY_PLAYLISTS_BROWSE_ID: &str = "FEmusic_liked_playlists";
// Upper bound on continuation requests for a single listing
const MAX_PAGES: usize = 200;

/// Where a paged listing keeps its items, on the first page and on continuation pages
struct Shelf {
    renderer: &'static str,
    continuation: &'static str,
}

const PLAYLIST_SHELF: Shelf = Shelf {
    renderer: "musicPlaylistShelfRenderer",
    continuation: "musicPlaylistShelfContinuation",
};

const LIBRARY_GRID: Shelf = Shelf {
    renderer: "gridRenderer",
    continuation: "gridContinuation",
};

struct Session {
    cookie: String,
    sapisid: String,
    api_key: Option<String>,
    client_version: String,
    visitor_data: Option<String>,
}

impl Session {
    fn context(&self) -> Value {
        json!({
            "client": {
                "clientName": "WEB_REMIX",
                "clientVersion": self.client_version,
                "hl": "en",
                "gl": "US",
            },
            "user": {},
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, header_value(&self.cookie)?);
        headers.insert(
            AUTHORIZATION,
            header_value(&sapisid_hash(&self.sapisid, timestamp))?,
        );
        headers.insert(ORIGIN, HeaderValue::from_static(YTM_DOMAIN));
        headers.insert("x-origin", HeaderValue::from_static(YTM_DOMAIN));
        headers.insert("x-goog-authuser", HeaderValue::from_static("0"));
        if let Some(visitor_data) = &self.visitor_data {
            headers.insert("x-goog-visitor-id", header_value(visitor_data)?);
        }
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Authentication(format!("invalid header value: {e}")))
}

/// YouTube Music client speaking the InnerTube web API with a browser cookie
pub struct YouTubeMusicClient {
    client: Client,
    session: Option<Session>,
}

impl YouTubeMusicClient {
    pub fn new(client: Client) -> Self {
        YouTubeMusicClient {
            client,
            session: None,
        }
    }

    pub fn try_default() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(YouTubeMusicClient::new(client))
    }

    fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(Error::NotAuthenticated)
    }

    async fn send(&self, endpoint: &str, mut body: Value, query: &[(&str, &str)]) -> Result<Value> {
        let session = self.session()?;
        if let Value::Object(map) = &mut body {
            map.insert("context".into(), session.context());
        }

        let mut request = self
            .client
            .post(format!("{YTM_API_URL}{endpoint}"))
            .query(&[("alt", "json"), ("prettyPrint", "false")])
            .query(query)
            .headers(session.headers()?)
            .json(&body);
        if let Some(api_key) = &session.api_key {
            request = request.query(&[("key", api_key.as_str())]);
        }

        debug!("POST {endpoint}");
        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }

    // Browse a paged listing and follow continuation tokens until exhausted.
    // Returns the first page alongside the parsed items of every page.
    async fn browse_shelf<T: Send>(
        &self,
        body: Value,
        shelf: &Shelf,
        parse: fn(&Value) -> Option<T>,
    ) -> Result<(Value, Vec<T>)> {
        let first = self.send("browse", body, &[]).await?;
        let (items, mut token) = shelf_page(&first, shelf);
        let mut parsed: Vec<T> = items.into_iter().filter_map(parse).collect();

        let mut seen = HashSet::new();
        let mut pages = 1;
        while let Some(current) = token.take() {
            ensure_next_page(&mut seen, &current, pages)?;
            let page = self
                .send(
                    "browse",
                    json!({ "continuation": current }),
                    &[
                        ("ctoken", current.as_str()),
                        ("continuation", current.as_str()),
                        ("type", "next"),
                    ],
                )
                .await?;
            let (items, next) = shelf_page(&page, shelf);
            parsed.extend(items.into_iter().filter_map(parse));
            token = next;
            pages += 1;
        }
        debug!("Fetched {} item(s) over {pages} page(s)", parsed.len());

        Ok((first, parsed))
    }
}

#[async_trait]
impl MusicService for YouTubeMusicClient {
    async fn authenticate(&mut self, cookie: &str) -> Result<()> {
        let sapisid = sapisid_from_cookie(cookie).ok_or_else(|| {
            Error::Authentication("cookie does not contain a SAPISID value".into())
        })?;

        debug!("Fetching YouTube Music landing page ...");
        let page = self
            .client
            .get(YTM_DOMAIN)
            .header(COOKIE, cookie)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let config = extract_ytcfg(&page);
        if config.is_empty() {
            warn!("No ytcfg found on the landing page, falling back to defaults");
        }
        if config.get("LOGGED_IN").and_then(Value::as_bool) == Some(false) {
            return Err(Error::Authentication(
                "YouTube Music did not accept the cookie (not logged in)".into(),
            ));
        }

        let text = |key: &str| config.get(key).and_then(Value::as_str).map(str::to_string);
        let session = Session {
            cookie: cookie.to_string(),
            sapisid,
            api_key: text("INNERTUBE_API_KEY"),
            client_version: text("INNERTUBE_CLIENT_VERSION")
                .unwrap_or_else(|| DEFAULT_CLIENT_VERSION.to_string()),
            visitor_data: text("VISITOR_DATA"),
        };
        debug!("Authenticated with client version {}", session.client_version);
        self.session = Some(session);
        Ok(())
    }

    async fn library_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let (_, playlists) = self
            .browse_shelf(
                json!({ "browseId": LIBRARY_PLAYLISTS_BROWSE_ID }),
                &LIBRARY_GRID,
                parse_playlist_summary,
            )
            .await?;
        Ok(playlists)
    }

    async fn playlist(&self, playlist_id: &str) -> Result<Playlist> {
        let id = strip_browse_prefix(playlist_id);
        let (first, tracks) = self
            .browse_shelf(
                json!({ "browseId": format!("VL{id}") }),
                &PLAYLIST_SHELF,
                parse_track,
            )
            .await?;

        let name = ["musicResponsiveHeaderRenderer", "musicDetailHeaderRenderer"]
            .iter()
            .find_map(|key| find_key(&first, key))
            .and_then(|header| header.pointer("/title/runs/0/text"))
            .and_then(Value::as_str)
            .map(str::to_string);

        if find_key(&first, PLAYLIST_SHELF.renderer).is_none() {
            debug!("Playlist {id} has no track shelf");
            return Ok(Playlist {
                id: id.to_string(),
                name,
                tracks: None,
            });
        }

        Ok(Playlist {
            id: id.to_string(),
            name,
            tracks: Some(tracks),
        })
    }

    async fn remove_tracks(&self, playlist_id: &str, tracks: &[Track]) -> Result<bool> {
        if tracks.is_empty() {
            return Ok(true);
        }
        let mut actions = Vec::with_capacity(tracks.len());
        for track in tracks {
            let (Some(video_id), Some(set_video_id)) = (&track.video_id, &track.set_video_id)
            else {
                warn!("Track \"{}\" has no playlist entry id, cannot remove it", track.title);
                return Ok(false);
            };
            actions.push(json!({
                "setVideoId": set_video_id,
                "removedVideoId": video_id,
                "action": "ACTION_REMOVE_VIDEO",
            }));
        }

        let body = json!({
            "playlistId": strip_browse_prefix(playlist_id),
            "actions": actions,
        });
        let response = self.send("browse/edit_playlist", body, &[]).await?;
        Ok(edit_succeeded(&response))
    }

    async fn add_tracks(&self, playlist_id: &str, tracks: &[Track]) -> Result<Option<Playlist>> {
        let mut actions = Vec::with_capacity(tracks.len());
        for track in tracks {
            let Some(video_id) = &track.video_id else {
                warn!("Track \"{}\" has no video id, cannot add it", track.title);
                return Ok(None);
            };
            actions.push(json!({
                "action": "ACTION_ADD_VIDEO",
                "addedVideoId": video_id,
                "dedupeOption": "DEDUPE_OPTION_SKIP",
            }));
        }

        if !actions.is_empty() {
            let body = json!({
                "playlistId": strip_browse_prefix(playlist_id),
                "actions": actions,
            });
            let response = self.send("browse/edit_playlist", body, &[]).await?;
            if !edit_succeeded(&response) {
                debug!("Add response: {response}");
                return Ok(None);
            }
        }

        // The insert already went through, a failed re-read must not look like a failed add
        match self.playlist(playlist_id).await {
            Ok(playlist) => Ok(Some(playlist)),
            Err(e) => {
                warn!("Tracks were added but the playlist could not be re-read: {e}");
                Ok(Some(Playlist {
                    id: strip_browse_prefix(playlist_id).to_string(),
                    name: None,
                    tracks: None,
                }))
            }
        }
    }
}

// A listing that cannot be followed to its end must not be treated as complete
fn ensure_next_page(seen: &mut HashSet<String>, token: &str, pages: usize) -> Result<()> {
    if !seen.insert(token.to_string()) {
        return Err(Error::UnexpectedResponse(
            "continuation token repeated, listing is incomplete".into(),
        ));
    }
    if pages >= MAX_PAGES {
        return Err(Error::UnexpectedResponse(format!(
            "listing has more than {MAX_PAGES} pages"
        )));
    }
    Ok(())
}

fn strip_browse_prefix(playlist_id: &str) -> &str {
    playlist_id.strip_prefix("VL").unwrap_or(playlist_id)
}

fn edit_succeeded(response: &Value) -> bool {
    response.get("status").and_then(Value::as_str) == Some("STATUS_SUCCEEDED")
}

pub(crate) fn sapisid_from_cookie(cookie: &str) -> Option<String> {
    let mut fallback = None;
    for pair in cookie.split(';') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        match key.trim() {
            "SAPISID" => return Some(value.trim().to_string()),
            "__Secure-3PAPISID" => fallback = Some(value.trim().to_string()),
            _ => {}
        }
    }
    fallback
}

pub(crate) fn sapisid_hash(sapisid: &str, timestamp: u64) -> String {
    let digest = Sha1::digest(format!("{timestamp} {sapisid} {YTM_DOMAIN}").as_bytes());
    format!("SAPISIDHASH {timestamp}_{digest:x}")
}

/// Merge every `ytcfg.set({...})` object found in the landing page
pub(crate) fn extract_ytcfg(page: &str) -> Map<String, Value> {
    let mut config = Map::new();
    for (start, marker) in page.match_indices("ytcfg.set(") {
        let rest = page[start + marker.len()..].trim_start();
        if !rest.starts_with('{') {
            continue;
        }
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => config.extend(map),
            Some(Err(e)) => debug!("Skipping unparsable ytcfg block: {e}"),
            _ => {}
        }
    }
    config
}

pub(crate) fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|v| find_key(v, key))),
        Value::Array(items) => items.iter().find_map(|v| find_key(v, key)),
        _ => None,
    }
}

fn shelf_page<'a>(page: &'a Value, shelf: &Shelf) -> (Vec<&'a Value>, Option<String>) {
    let container = find_key(page, shelf.renderer)
        .or_else(|| find_key(page, shelf.continuation))
        .or_else(|| find_key(page, "appendContinuationItemsAction"));
    let Some(container) = container else {
        return (Vec::new(), None);
    };

    let items: Vec<&Value> = ["contents", "items", "continuationItems"]
        .iter()
        .find_map(|key| container.get(*key))
        .and_then(Value::as_array)
        .map(|items| items.iter().collect())
        .unwrap_or_default();

    let token = container
        .pointer("/continuations/0/nextContinuationData/continuation")
        .or_else(|| {
            items.iter().find_map(|item| {
                item.pointer("/continuationItemRenderer/continuationEndpoint/continuationCommand/token")
            })
        })
        .and_then(Value::as_str)
        .map(str::to_string);

    (items, token)
}

fn run_text(run: &Value) -> Option<String> {
    run.get("text").and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn parse_playlist_summary(item: &Value) -> Option<PlaylistSummary> {
    let renderer = item.get("musicTwoRowItemRenderer")?;
    let name = renderer.pointer("/title/runs/0/text").and_then(Value::as_str)?;
    let id = renderer
        .pointer("/navigationEndpoint/browseEndpoint/browseId")
        .or_else(|| renderer.pointer("/title/runs/0/navigationEndpoint/browseEndpoint/browseId"))
        .and_then(Value::as_str)
        .map(|id| strip_browse_prefix(id).to_string());
    Some(PlaylistSummary {
        id,
        name: name.to_string(),
    })
}

pub(crate) fn parse_track(item: &Value) -> Option<Track> {
    let renderer = item.get("musicResponsiveListItemRenderer")?;
    let flex = renderer.get("flexColumns")?.as_array()?;
    let column = |index: usize| {
        flex.get(index)
            .and_then(|c| c.pointer("/musicResponsiveListItemFlexColumnRenderer/text/runs"))
            .and_then(Value::as_array)
    };

    let title_run = column(0)?.first()?;
    let title = run_text(title_run)?;

    let video_id = renderer
        .pointer("/playlistItemData/videoId")
        .or_else(|| title_run.pointer("/navigationEndpoint/watchEndpoint/videoId"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let set_video_id = renderer
        .pointer("/playlistItemData/playlistSetVideoId")
        .or_else(|| {
            renderer
                .get("menu")
                .and_then(|menu| find_key(menu, "playlistEditEndpoint"))
                .and_then(|endpoint| endpoint.pointer("/actions/0/setVideoId"))
        })
        .and_then(Value::as_str)
        .map(str::to_string);

    let artists = column(1).map(|runs| parse_artists(runs)).unwrap_or_default();
    let album = column(2).and_then(|runs| runs.first()).and_then(run_text);
    let duration = renderer
        .pointer("/fixedColumns/0/musicResponsiveListItemFixedColumnRenderer/text/runs/0/text")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(Track {
        video_id,
        set_video_id,
        title,
        artists,
        album,
        duration,
    })
}

fn parse_artists(runs: &[Value]) -> Vec<Artist> {
    let linked: Vec<Artist> = runs
        .iter()
        .filter_map(|run| {
            let endpoint = run.pointer("/navigationEndpoint/browseEndpoint")?;
            let page_type = endpoint
                .pointer("/browseEndpointContextSupportedConfigs/browseEndpointContextMusicConfig/pageType")
                .and_then(Value::as_str)?;
            if page_type != "MUSIC_PAGE_TYPE_ARTIST" && page_type != "MUSIC_PAGE_TYPE_USER_CHANNEL" {
                return None;
            }
            Some(Artist {
                name: run_text(run),
                id: endpoint
                    .get("browseId")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect();
    if !linked.is_empty() {
        return linked;
    }

    // Unlinked artists come as plain text, e.g. "Someone • 1.2M views"
    runs.first()
        .and_then(run_text)
        .and_then(|text| {
            text.split(" • ")
                .next()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(Artist::named)
        })
        .into_iter()
        .collect()
}
