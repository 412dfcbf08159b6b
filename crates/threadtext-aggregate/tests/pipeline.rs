//! End-to-end aggregation tests over in-memory threads with a stubbed
//! document host.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;
use threadtext_aggregate::{
    AggregationError, EmbedAggregate, EmbedOptions, FullTextOptions, TextAggregator,
    UnresolvableReason,
};
use threadtext_core::{Attachment, Author, ChannelKind, Embed, EmbedField, HistoryOrder, Message};
use threadtext_docs::{DocumentFetcher, FetchError, FetchResult, LinkedDocumentReference};
use threadtext_thread::MemoryThread;

/// Document host stub: known ids resolve to canned results, anything else
/// is a transport failure.
#[derive(Default)]
struct StubFetcher {
    docs: HashMap<String, FetchResult>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn with(mut self, id: &str, result: FetchResult) -> Self {
        self.docs.insert(id.to_string(), result);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl DocumentFetcher for StubFetcher {
    async fn fetch(&self, reference: &LinkedDocumentReference) -> Result<FetchResult, FetchError> {
        self.calls.lock().push(reference.document_id.clone());
        match self.docs.get(&reference.document_id) {
            Some(result) => Ok(result.clone()),
            None => Err(FetchError::Transport {
                url: reference.url.clone(),
                reason: "connection refused".into(),
            }),
        }
    }
}

fn msg(id: u64, bot: bool, content: &str) -> Message {
    Message {
        id,
        author: Author {
            id: if bot { "bot".into() } else { format!("user-{}", id) },
            name: if bot { "helper-bot".into() } else { "student".into() },
            bot,
        },
        content: content.to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(id as i64),
        attachments: Vec::new(),
        embeds: Vec::new(),
        reactions: Vec::new(),
    }
}

fn text_attachment(id: &str) -> Attachment {
    Attachment {
        id: id.to_string(),
        filename: format!("{}.txt", id),
        content_type: Some("text/plain; charset=utf-8".into()),
        size: None,
    }
}

fn with_attachments(mut message: Message, attachments: Vec<Attachment>) -> Message {
    message.attachments = attachments;
    message
}

fn with_embed(mut message: Message, fields: &[(&str, &str)]) -> Message {
    message.embeds.push(Embed {
        title: None,
        fields: fields
            .iter()
            .map(|(n, v)| EmbedField {
                name: n.to_string(),
                value: v.to_string(),
            })
            .collect(),
    });
    message
}

fn doc_link(id: &str) -> String {
    format!("https://docs.google.com/document/d/{}/edit?usp=sharing", id)
}

fn thread() -> MemoryThread {
    MemoryThread::new("thread-1", ChannelKind::PublicThread)
}

#[tokio::test]
async fn test_end_to_end_example() {
    let thread = thread()
        .with_message(msg(1, true, "skip me"))
        .with_message(msg(2, false, "hello world"))
        .with_message(with_attachments(msg(3, false, ""), vec![text_attachment("f")]))
        .with_attachment_body("f", "from file");
    let aggregator = TextAggregator::new(StubFetcher::default());

    let corpus = aggregator
        .aggregate_full_text(&thread, FullTextOptions::default())
        .await
        .unwrap();
    assert_eq!(corpus, "hello world\nfrom file");
}

#[tokio::test]
async fn test_inline_only_thread() {
    let thread = thread()
        .with_message(msg(1, false, "first"))
        .with_message(msg(2, true, "beep"))
        .with_message(msg(3, false, "second"))
        .with_message(msg(4, false, ""))
        .with_message(msg(5, false, "third"));
    let aggregator = TextAggregator::new(StubFetcher::default()).with_page_size(2);

    let corpus = aggregator
        .aggregate_full_text(&thread, FullTextOptions::default())
        .await
        .unwrap();
    assert_eq!(corpus, "first\nsecond\n\nthird\n");
}

#[tokio::test]
async fn test_include_automated_authors() {
    let thread = thread()
        .with_message(msg(1, false, "human"))
        .with_message(msg(2, true, "bot"));
    let aggregator = TextAggregator::new(StubFetcher::default());

    let options = FullTextOptions {
        include_automated_authors: true,
        ..FullTextOptions::default()
    };
    let corpus = aggregator.aggregate_full_text(&thread, options).await.unwrap();
    assert_eq!(corpus, "human\nbot\n");
}

#[tokio::test]
async fn test_attachment_beats_inline_and_links() {
    let thread = thread()
        .with_message(with_attachments(
            msg(1, false, &format!("see file, also {}", doc_link("doc-a"))),
            vec![text_attachment("f")],
        ))
        .with_attachment_body("f", "file body");
    let fetcher = Arc::new(StubFetcher::default().with("doc-a", FetchResult::Text("doc body".into())));
    let aggregator = TextAggregator::new(Arc::clone(&fetcher));

    let corpus = aggregator
        .aggregate_full_text(&thread, FullTextOptions::default())
        .await
        .unwrap();
    assert_eq!(corpus, "file body");
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_second_attachment_overwrites_first() {
    let thread = thread()
        .with_message(with_attachments(
            msg(1, false, "inline"),
            vec![text_attachment("one"), text_attachment("two")],
        ))
        .with_attachment_body("one", "first file")
        .with_attachment_body("two", "second file");
    let aggregator = TextAggregator::new(StubFetcher::default());

    let corpus = aggregator
        .aggregate_full_text(&thread, FullTextOptions::default())
        .await
        .unwrap();
    assert_eq!(corpus, "second file");
}

#[tokio::test]
async fn test_linked_documents_concatenated_in_link_order() {
    let thread = thread().with_message(msg(
        1,
        false,
        &format!("part 2 {} and part 1 {}", doc_link("b"), doc_link("a")),
    ));
    let fetcher = Arc::new(
        StubFetcher::default()
            .with("a", FetchResult::Text("AAA".into()))
            .with("b", FetchResult::Text("BBB".into())),
    );
    let aggregator = TextAggregator::new(Arc::clone(&fetcher));

    let corpus = aggregator
        .aggregate_full_text(&thread, FullTextOptions::default())
        .await
        .unwrap();
    assert_eq!(corpus, "BBBAAA");
    assert_eq!(fetcher.calls(), vec!["b", "a"]);
}

#[tokio::test]
async fn test_denied_document_aborts_everything() {
    let thread = thread()
        .with_message(msg(1, false, "earlier text"))
        .with_message(msg(2, false, &format!("{} {}", doc_link("ok"), doc_link("private"))))
        .with_message(msg(3, false, "later text"));
    let fetcher = Arc::new(
        StubFetcher::default()
            .with("ok", FetchResult::Text("fine".into()))
            .with("private", FetchResult::Denied),
    );
    let aggregator = TextAggregator::new(Arc::clone(&fetcher));

    let err = aggregator
        .aggregate_full_text(&thread, FullTextOptions::default())
        .await
        .unwrap_err();
    match err {
        AggregationError::UnresolvableDocument { url, reason } => {
            assert_eq!(url, doc_link("private"));
            assert_eq!(reason, UnresolvableReason::Denied);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fetcher.calls(), vec!["ok", "private"]);
}

#[tokio::test]
async fn test_empty_document_aborts() {
    let thread = thread().with_message(msg(1, false, &doc_link("blank")));
    let fetcher = StubFetcher::default().with("blank", FetchResult::Text(String::new()));
    let aggregator = TextAggregator::new(fetcher);

    let err = aggregator
        .aggregate_full_text(&thread, FullTextOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AggregationError::UnresolvableDocument {
            reason: UnresolvableReason::Empty,
            ..
        }
    ));
}

#[tokio::test]
async fn test_transport_failure_is_distinct_from_denial() {
    let thread = thread().with_message(msg(1, false, &doc_link("unreachable")));
    let aggregator = TextAggregator::new(StubFetcher::default());

    let err = aggregator
        .aggregate_full_text(&thread, FullTextOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AggregationError::Fetch(FetchError::Transport { .. })
    ));
}

#[tokio::test]
async fn test_undecodable_attachment_is_a_warning() {
    let thread = thread()
        .with_message(with_attachments(
            msg(1, false, "fallback inline"),
            vec![text_attachment("bad")],
        ))
        .with_message(msg(2, false, "next"))
        .with_attachment_body("bad", vec![0xc3, 0x28]);
    let aggregator = TextAggregator::new(StubFetcher::default());

    let report = aggregator
        .aggregate_full_text_report(&thread, FullTextOptions::default())
        .await
        .unwrap();
    assert_eq!(report.text, "fallback inline\nnext\n");
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].message_id, 1);
    assert_eq!(report.messages_seen, 2);
    assert_eq!(report.messages_used, 2);
}

#[tokio::test]
async fn test_valid_last_attachment_wins_over_undecodable_earlier_one() {
    let thread = thread()
        .with_message(with_attachments(
            msg(1, false, "inline"),
            vec![text_attachment("bad"), text_attachment("good")],
        ))
        .with_attachment_body("bad", vec![0xc3, 0x28])
        .with_attachment_body("good", "good file");
    let aggregator = TextAggregator::new(StubFetcher::default());

    let report = aggregator
        .aggregate_full_text_report(&thread, FullTextOptions::default())
        .await
        .unwrap();
    assert_eq!(report.text, "good file");
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_unreadable_attachment_is_platform_error() {
    let thread = thread().with_message(with_attachments(
        msg(1, false, "inline"),
        vec![text_attachment("missing")],
    ));
    let aggregator = TextAggregator::new(StubFetcher::default());

    let err = aggregator
        .aggregate_full_text(&thread, FullTextOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AggregationError::Platform(_)));
}

#[tokio::test]
async fn test_full_text_is_idempotent() {
    let thread = thread()
        .with_message(msg(1, false, "alpha"))
        .with_message(msg(2, false, &doc_link("d")))
        .with_message(with_attachments(msg(3, false, ""), vec![text_attachment("f")]))
        .with_attachment_body("f", "file");
    let fetcher = StubFetcher::default().with("d", FetchResult::Text("doc\n".into()));
    let aggregator = TextAggregator::new(fetcher);

    let first = aggregator
        .aggregate_full_text_report(&thread, FullTextOptions::default())
        .await
        .unwrap();
    let second = aggregator
        .aggregate_full_text_report(&thread, FullTextOptions::default())
        .await
        .unwrap();
    assert_eq!(first.text, "alpha\ndoc\nfile");
    assert_eq!(first.text, second.text);
    assert_eq!(first.digest(), second.digest());
}

#[tokio::test]
async fn test_empty_thread_yields_empty_corpus() {
    let thread = thread();
    let aggregator = TextAggregator::new(StubFetcher::default());

    let corpus = aggregator
        .aggregate_full_text(&thread, FullTextOptions::default())
        .await
        .unwrap();
    assert_eq!(corpus, "");
}

#[tokio::test]
async fn test_non_thread_rejected_in_both_modes() {
    let channel = MemoryThread::new("general", ChannelKind::Text).with_message(msg(1, false, "hi"));
    let aggregator = TextAggregator::new(StubFetcher::default());

    let err = aggregator
        .aggregate_full_text(&channel, FullTextOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AggregationError::NotAThread { .. }));

    let err = aggregator
        .aggregate_embed_text(&channel, EmbedOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AggregationError::NotAThread { .. }));
}

fn embed_thread() -> MemoryThread {
    thread()
        .with_message(with_embed(msg(1, false, ""), &[("Q1", "yes"), ("Q2", "no")]))
        .with_message(with_embed(
            with_embed(msg(2, true, ""), &[("Score", "9")]),
            &[("Note", "ok")],
        ))
}

#[tokio::test]
async fn test_embed_split_fields_newest_first() {
    let aggregator = TextAggregator::new(StubFetcher::default());

    let result = aggregator
        .aggregate_embed_text(&embed_thread(), EmbedOptions::default())
        .await
        .unwrap();
    assert_eq!(
        result,
        EmbedAggregate::Split {
            names: "ScoreNoteQ1Q2".into(),
            values: "9okyesno".into(),
        }
    );
}

#[tokio::test]
async fn test_embed_merged_fields() {
    let aggregator = TextAggregator::new(StubFetcher::default());

    let options = EmbedOptions {
        split_fields: false,
        order: HistoryOrder::OldestFirst,
        ..EmbedOptions::default()
    };
    let result = aggregator
        .aggregate_embed_text(&embed_thread(), options)
        .await
        .unwrap();
    assert_eq!(result, EmbedAggregate::Merged("Q1yesQ2noScore9Noteok".into()));
}

#[tokio::test]
async fn test_embed_excluding_automated_authors() {
    let aggregator = TextAggregator::new(StubFetcher::default());

    let options = EmbedOptions {
        include_automated_authors: false,
        ..EmbedOptions::default()
    };
    let result = aggregator
        .aggregate_embed_text(&embed_thread(), options)
        .await
        .unwrap();
    assert_eq!(
        result,
        EmbedAggregate::Split {
            names: "Q1Q2".into(),
            values: "yesno".into(),
        }
    );
}

#[tokio::test]
async fn test_embed_scan_limit() {
    let aggregator = TextAggregator::new(StubFetcher::default());

    let options = EmbedOptions {
        limit: Some(1),
        ..EmbedOptions::default()
    };
    let result = aggregator
        .aggregate_embed_text(&embed_thread(), options)
        .await
        .unwrap();
    assert_eq!(
        result,
        EmbedAggregate::Split {
            names: "ScoreNote".into(),
            values: "9ok".into(),
        }
    );
}
