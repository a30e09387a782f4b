use super::*;
use crate::config::ThrottleConfig;
use crate::error::Error;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory source serving canned list entries and detail payloads
#[derive(Default)]
struct StaticSource {
    entries: Vec<MonsterRef>,
    details: HashMap<String, Value>,
    fail_list: bool,
    requested: Mutex<Vec<String>>,
}

impl StaticSource {
    fn new(monsters: &[(&str, f64)]) -> Self {
        let mut source = Self::default();
        for &(index, rating) in monsters {
            source.add(index, payload(index, rating));
        }
        source
    }

    fn add(&mut self, index: &str, detail: Value) {
        self.entries.push(MonsterRef {
            index: index.to_string(),
            name: display_name(index),
        });
        self.details.insert(index.to_string(), detail);
    }

    /// List an entry whose detail request fails
    fn add_missing(&mut self, index: &str) {
        self.entries.push(MonsterRef {
            index: index.to_string(),
            name: display_name(index),
        });
    }
}

#[async_trait]
impl MonsterSource for StaticSource {
    async fn list(&self) -> Result<Vec<MonsterRef>> {
        if self.fail_list {
            return Err(Error::Http {
                status: 503,
                url: "memory://monsters".to_string(),
            });
        }
        Ok(self.entries.clone())
    }

    async fn detail(&self, index: &str) -> Result<ApiMonster> {
        self.requested.lock().unwrap().push(index.to_string());
        let value = self.details.get(index).cloned().ok_or_else(|| Error::Http {
            status: 404,
            url: format!("memory://monsters/{index}"),
        })?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Lets a test keep inspecting a source after handing it to the fetcher
struct Shared(Arc<StaticSource>);

#[async_trait]
impl MonsterSource for Shared {
    async fn list(&self) -> Result<Vec<MonsterRef>> {
        self.0.list().await
    }

    async fn detail(&self, index: &str) -> Result<ApiMonster> {
        self.0.detail(index).await
    }
}

fn display_name(index: &str) -> String {
    index.replace('-', " ")
}

fn payload(index: &str, rating: f64) -> Value {
    json!({
        "index": index,
        "name": display_name(index),
        "size": "Medium",
        "type": "beast",
        "alignment": "unaligned",
        "armor_class": [{ "type": "natural", "value": 12 }],
        "hit_points": 11,
        "hit_dice": "2d8",
        "speed": { "walk": "30 ft." },
        "challenge_rating": rating,
        "xp": 50,
    })
}

fn test_config() -> FetchConfig {
    FetchConfig {
        exclude: vec![],
        request_delay: Duration::ZERO,
        ..Default::default()
    }
}

fn indices(document: &Document, band: Band) -> Vec<&str> {
    document
        .band(band)
        .iter()
        .map(|m| m.index.as_str())
        .collect()
}

#[tokio::test]
async fn test_all_candidates_excluded_yields_empty_document() {
    let source = StaticSource::new(&[("goblin", 0.25), ("orc", 0.5), ("ogre", 2.0)]);
    let config = FetchConfig {
        exclude: vec!["goblin".into(), "orc".into(), "ogre".into()],
        ..test_config()
    };
    let fetcher = Fetcher::with_source(config, Box::new(source));

    let (document, report) = fetcher.run().await.unwrap();

    assert_eq!(document.total(), 0);
    assert_eq!(document.bands().count(), 6);
    assert!(document.bands().all(|(_, monsters)| monsters.is_empty()));
    assert_eq!(report.excluded, 3);
    assert_eq!(report.accepted, 0);
}

#[tokio::test]
async fn test_excluded_monsters_are_never_requested() {
    let source = Arc::new(StaticSource::new(&[("goblin", 0.25), ("werewolf", 3.0)]));
    let config = FetchConfig {
        exclude: vec!["goblin".into()],
        ..test_config()
    };
    let fetcher = Fetcher::with_source(config, Box::new(Shared(source.clone())));

    let (document, report) = fetcher.run().await.unwrap();

    assert_eq!(indices(&document, Band::Mid), ["werewolf"]);
    assert!(document.band(Band::Low).is_empty());
    assert_eq!(report.excluded, 1);
    assert_eq!(*source.requested.lock().unwrap(), ["werewolf"]);
}

#[tokio::test]
async fn test_default_exclusions_apply() {
    let source = StaticSource::new(&[("goblin", 0.25), ("werewolf", 3.0)]);
    let config = FetchConfig {
        request_delay: Duration::ZERO,
        ..Default::default()
    };
    let fetcher = Fetcher::with_source(config, Box::new(source));

    let (document, _) = fetcher.run().await.unwrap();

    assert_eq!(document.total(), 1);
    assert_eq!(indices(&document, Band::Mid), ["werewolf"]);
}

#[tokio::test]
async fn test_stops_at_target_count() {
    let source = StaticSource::new(&[
        ("ape", 0.5),
        ("bandit", 0.125),
        ("cultist", 0.125),
        ("dretch", 0.25),
        ("ettin", 4.0),
    ]);
    let config = FetchConfig {
        target_count: 3,
        ..test_config()
    };
    let fetcher = Fetcher::with_source(config, Box::new(source));

    let (document, report) = fetcher.run().await.unwrap();

    assert_eq!(document.total(), 3);
    assert_eq!(report.accepted, 3);
    assert_eq!(indices(&document, Band::Low), ["ape", "bandit", "cultist"]);
    assert!(document.band(Band::Mid).is_empty());
}

#[tokio::test]
async fn test_target_reached_stops_before_requesting_more() {
    let source = Arc::new(StaticSource::new(&[
        ("ape", 0.5),
        ("bandit", 0.125),
        ("cultist", 0.125),
    ]));
    let config = FetchConfig {
        target_count: 2,
        ..test_config()
    };
    let fetcher = Fetcher::with_source(config, Box::new(Shared(source.clone())));
    fetcher.run().await.unwrap();

    assert_eq!(*source.requested.lock().unwrap(), ["ape", "bandit"]);
}

#[tokio::test]
async fn test_low_rating_throttle_after_enough_accepted() {
    let source = StaticSource::new(&[
        ("ape", 4.0),
        ("bandit", 5.0),
        ("cultist", 6.0),
        ("dretch", 1.0),
        ("ettin", 2.99),
        ("fire-giant", 9.0),
        ("golem", 3.0),
    ]);
    let config = FetchConfig {
        throttle: ThrottleConfig {
            below_rating: 3.0,
            after_accepted: 2,
        },
        ..test_config()
    };
    let fetcher = Fetcher::with_source(config, Box::new(source));

    let (document, report) = fetcher.run().await.unwrap();

    // accepted is 3 when "dretch" is considered, which is more than 2
    assert_eq!(report.throttled, 2);
    assert!(document.band(Band::Low).is_empty());
    assert_eq!(indices(&document, Band::Mid), ["ape", "bandit", "golem"]);
    assert_eq!(indices(&document, Band::High), ["cultist", "fire-giant"]);
}

#[tokio::test]
async fn test_throttle_requires_strictly_more_than_threshold() {
    let source = StaticSource::new(&[("ape", 4.0), ("bandit", 5.0), ("cultist", 0.5)]);
    let config = FetchConfig {
        throttle: ThrottleConfig {
            below_rating: 3.0,
            after_accepted: 2,
        },
        ..test_config()
    };
    let fetcher = Fetcher::with_source(config, Box::new(source));

    let (document, report) = fetcher.run().await.unwrap();

    // exactly 2 accepted is not more than 2
    assert_eq!(report.throttled, 0);
    assert_eq!(indices(&document, Band::Low), ["cultist"]);
}

#[tokio::test]
async fn test_per_record_failures_are_skipped() {
    let mut source = StaticSource::new(&[("ape", 0.5)]);
    source.add_missing("broken");
    source.add("nameless", json!({ "index": "nameless", "challenge_rating": 1 }));
    source.add("garbled", json!({ "index": "garbled", "name": "Garbled", "hit_points": "many" }));
    source.add("werewolf", payload("werewolf", 3.0));

    let fetcher = Fetcher::with_source(test_config(), Box::new(source));
    let (document, report) = fetcher.run().await.unwrap();

    assert_eq!(report.failed, 3);
    assert_eq!(report.accepted, 2);
    assert_eq!(indices(&document, Band::Low), ["ape"]);
    assert_eq!(indices(&document, Band::Mid), ["werewolf"]);
}

#[tokio::test]
async fn test_failed_candidates_do_not_count_toward_target() {
    let mut source = StaticSource::default();
    source.add_missing("broken");
    source.add("ape", payload("ape", 0.5));
    source.add("bandit", payload("bandit", 0.125));

    let config = FetchConfig {
        target_count: 2,
        ..test_config()
    };
    let fetcher = Fetcher::with_source(config, Box::new(source));
    let (document, _) = fetcher.run().await.unwrap();

    assert_eq!(indices(&document, Band::Low), ["ape", "bandit"]);
}

#[tokio::test]
async fn test_list_failure_aborts_run() {
    let source = StaticSource {
        fail_list: true,
        ..StaticSource::new(&[("ape", 0.5)])
    };
    let fetcher = Fetcher::with_source(test_config(), Box::new(source));

    let result = fetcher.run().await;
    assert!(matches!(result, Err(Error::Http { status: 503, .. })));
}

#[tokio::test]
async fn test_band_assignment_uses_inclusive_upper_bounds() {
    let source = StaticSource::new(&[
        ("a", 0.0),
        ("b", 2.0),
        ("c", 2.5),
        ("d", 5.0),
        ("e", 10.0),
        ("f", 11.0),
        ("g", 15.0),
        ("h", 20.0),
        ("i", 21.0),
        ("j", 30.0),
    ]);
    let fetcher = Fetcher::with_source(test_config(), Box::new(source));

    let (document, _) = fetcher.run().await.unwrap();

    assert_eq!(indices(&document, Band::Low), ["a", "b"]);
    assert_eq!(indices(&document, Band::Mid), ["c", "d"]);
    assert_eq!(indices(&document, Band::High), ["e"]);
    assert_eq!(indices(&document, Band::VeryHigh), ["f", "g"]);
    assert_eq!(indices(&document, Band::Epic), ["h"]);
    assert_eq!(indices(&document, Band::Legendary), ["i", "j"]);
}

#[tokio::test]
async fn test_rating_above_thirty_lands_in_top_band() {
    let source = StaticSource::new(&[("tarrasque-plus", 31.0)]);
    let fetcher = Fetcher::with_source(test_config(), Box::new(source));

    let (document, report) = fetcher.run().await.unwrap();

    assert_eq!(report.accepted, 1);
    assert_eq!(indices(&document, Band::Legendary), ["tarrasque-plus"]);
}

#[tokio::test]
async fn test_priority_flag_does_not_change_selection() {
    let mut source = StaticSource::new(&[("ape", 0.5)]);
    let mut dragon = payload("young-red-dragon", 10.0);
    dragon["legendary_actions"] = json!([{ "name": "Tail Attack", "desc": "Swish." }]);
    source.add("young-red-dragon", dragon);
    let config = FetchConfig {
        target_count: 1,
        ..test_config()
    };
    let fetcher = Fetcher::with_source(config, Box::new(source));

    let (document, _) = fetcher.run().await.unwrap();

    // list order wins even though the second entry is a priority candidate
    assert_eq!(document.total(), 1);
    assert_eq!(indices(&document, Band::Low), ["ape"]);
}

#[test]
fn test_priority_classification() {
    let parse = |value: Value| -> ApiMonster { serde_json::from_value(value).unwrap() };

    assert!(is_priority(&parse(payload("lich", 21.0)), "Lich"));
    assert!(is_priority(&parse(payload("young-green-dragon", 10.0)), "Young Green Dragon"));
    assert!(!is_priority(&parse(payload("young-green-dragon", 8.0)), "Young Green Dragon"));
    assert!(!is_priority(&parse(payload("ogre", 2.0)), "Ogre"));

    let mut legendary = payload("unicorn", 5.0);
    legendary["legendary_actions"] = json!([{ "name": "Shimmering Shield", "desc": "..." }]);
    assert!(is_priority(&parse(legendary), "Unicorn"));

    // the dragon check reads the list name, not the payload name
    assert!(is_priority(&parse(json!({ "challenge_rating": 10 })), "Shadow Dragon"));
    let mut renamed = payload("wyrmling", 10.0);
    renamed["name"] = json!("Red Dragon Wyrmling");
    assert!(!is_priority(&parse(renamed), "Wyrmling"));
}

// HTTP client

mod http {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> FetchConfig {
        FetchConfig {
            api_base: format!("{}/api/2014/", server.uri()),
            ..test_config()
        }
    }

    #[tokio::test]
    async fn test_api_client_lists_monsters() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/2014/monsters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "results": [
                    { "index": "aboleth", "name": "Aboleth", "url": "/api/2014/monsters/aboleth" },
                    { "index": "acolyte", "name": "Acolyte", "url": "/api/2014/monsters/acolyte" }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&config_for(&mock_server)).unwrap();
        let entries = client.list().await.unwrap();

        assert_eq!(
            entries,
            vec![
                MonsterRef {
                    index: "aboleth".into(),
                    name: "Aboleth".into()
                },
                MonsterRef {
                    index: "acolyte".into(),
                    name: "Acolyte".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_api_client_trims_trailing_slash() {
        let mock_server = MockServer::start().await;
        let client = ApiClient::new(&config_for(&mock_server)).unwrap();
        assert_eq!(client.base(), format!("{}/api/2014", mock_server.uri()));
    }

    #[tokio::test]
    async fn test_api_client_reports_http_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/2014/monsters/nothing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&config_for(&mock_server)).unwrap();
        let result = client.detail("nothing").await;

        match result {
            Err(Error::Http { status, url }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/api/2014/monsters/nothing"));
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_api_client_rejects_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/2014/monsters"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&config_for(&mock_server)).unwrap();
        assert!(matches!(
            client.list().await,
            Err(Error::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_api_client_retries_server_errors_when_enabled() {
        let mock_server = MockServer::start().await;

        // First request fails, the retry succeeds
        Mock::given(method("GET"))
            .and(path("/api/2014/monsters/ape"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/2014/monsters/ape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload("ape", 0.5)))
            .mount(&mock_server)
            .await;

        let mut config = config_for(&mock_server);
        config.retry.max_attempts = 2;
        config.retry.initial_delay = Duration::from_millis(1);
        config.retry.jitter = false;

        let client = ApiClient::new(&config).unwrap();
        let detail = client.detail("ape").await.unwrap();
        assert_eq!(detail.index.as_deref(), Some("ape"));
    }

    #[tokio::test]
    async fn test_fetcher_over_http_applies_defaults() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/2014/monsters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "results": [
                    { "index": "bat", "name": "Bat" },
                    { "index": "gone", "name": "Gone" },
                    { "index": "wolf", "name": "Wolf" }
                ]
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/2014/monsters/bat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "index": "bat",
                "name": "Bat",
                "challenge_rating": 0
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/2014/monsters/gone"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/2014/monsters/wolf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload("wolf", 0.25)))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new(config_for(&mock_server)).unwrap();
        let (document, report) = fetcher.run().await.unwrap();

        assert_eq!(report.listed, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(indices(&document, Band::Low), ["bat", "wolf"]);

        let bat = &document.band(Band::Low)[0];
        assert_eq!(bat.hit_points, 10);
        assert_eq!(bat.armor_class, 10);
        assert_eq!(bat.hit_dice, "1d8");
        assert_eq!(bat.challenge_rating, 0.0);
    }

    #[tokio::test]
    async fn test_fetcher_over_http_aborts_when_list_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/2014/monsters"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new(config_for(&mock_server)).unwrap();
        assert!(matches!(
            fetcher.run().await,
            Err(Error::Http { status: 500, .. })
        ));
    }
}
