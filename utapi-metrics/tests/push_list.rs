//! End-to-end scenarios driving the write path and reading the results back
//! through the listers.

use utapi_common::time::Clock;
use utapi_metrics::{
    Granularity, ListMetrics, MetricEvent, Operation, ResourceName, TimeRange, UtapiClient,
};
use utapi_redis::Datastore;

// 2017-07-14T02:30:00Z, interval aligned
const T0: u64 = 1_499_999_400_000;
const QUARTER: u64 = 15 * 60_000;

fn client_at(datastore: &Datastore, now: u64) -> UtapiClient {
    UtapiClient::new(Some(datastore.clone()), "s3", None).with_clock(Clock::fixed(now))
}

fn lister(datastore: &Datastore, granularity: Granularity) -> ListMetrics {
    ListMetrics::new(granularity, datastore.clone())
}

/// CreateBucket followed by a put of a new object, queried over a range
/// starting before the activity.
#[tokio::test]
async fn test_create_bucket_then_put() {
    let datastore = Datastore::memory();

    let create = MetricEvent::new(Operation::CreateBucket).with_bucket("demo");
    client_at(&datastore, T0).push_metric(&create).await.unwrap();

    // One minute later, still within the same interval.
    let put = MetricEvent::new(Operation::PutObject)
        .with_bucket("demo")
        .with_new_byte_length(1024);
    client_at(&datastore, T0 + 60_000)
        .push_metric(&put)
        .await
        .unwrap();

    let records = lister(&datastore, Granularity::Bucket)
        .list(&["demo".to_owned()], TimeRange::new(T0 - QUARTER, T0 + QUARTER))
        .await
        .unwrap();

    let record = &records[0];
    assert_eq!(record.storage_utilized, [0, 1024]);
    assert_eq!(record.number_of_objects, [0, 1]);
    assert_eq!(record.incoming_bytes, 1024);
    assert_eq!(record.outgoing_bytes, 0);
    assert_eq!(record.operations["s3:CreateBucket"], 1);
    assert_eq!(record.operations["s3:PutObject"], 1);
    assert_eq!(record.time_range, TimeRange::new(T0 - QUARTER, T0 + QUARTER));
}

/// Two writers hitting the same interval commute through the atomic
/// counters; the surviving sample reflects both.
#[tokio::test]
async fn test_two_puts_in_one_interval() {
    let datastore = Datastore::memory();
    let client = client_at(&datastore, T0);

    for _ in 0..2 {
        let put = MetricEvent::new(Operation::PutObject)
            .with_bucket("demo")
            .with_new_byte_length(500);
        client.push_metric(&put).await.unwrap();
    }

    let records = lister(&datastore, Granularity::Bucket)
        .list(&["demo".to_owned()], TimeRange::new(T0 - QUARTER, T0 + QUARTER))
        .await
        .unwrap();

    let record = &records[0];
    assert_eq!(record.storage_utilized, [0, 1000]);
    assert_eq!(record.number_of_objects, [0, 2]);
    assert_eq!(record.operations["s3:PutObject"], 2);
}

/// An overwrite adjusts storage by the size delta and leaves the object
/// count untouched.
#[tokio::test]
async fn test_overwrite_adjusts_by_delta() {
    let datastore = Datastore::memory();
    let client = client_at(&datastore, T0);

    let put = MetricEvent::new(Operation::PutObject)
        .with_bucket("demo")
        .with_new_byte_length(100);
    client.push_metric(&put).await.unwrap();

    let overwrite = MetricEvent::new(Operation::PutObject)
        .with_bucket("demo")
        .with_new_byte_length(150)
        .with_old_byte_length(100);
    client.push_metric(&overwrite).await.unwrap();

    let records = lister(&datastore, Granularity::Bucket)
        .list(&["demo".to_owned()], TimeRange::new(T0 - QUARTER, T0 + QUARTER))
        .await
        .unwrap();

    let record = &records[0];
    assert_eq!(record.storage_utilized, [0, 150]);
    assert_eq!(record.number_of_objects, [0, 1]);
    assert_eq!(record.incoming_bytes, 250);
}

/// A delete racing ahead of its put drives the counter negative; queries
/// never report the negative value.
#[tokio::test]
async fn test_delete_exceeding_storage_reads_as_zero() {
    let datastore = Datastore::memory();
    let client = client_at(&datastore, T0);

    let delete = MetricEvent::new(Operation::DeleteObject)
        .with_bucket("demo")
        .with_byte_length(100)
        .with_number_of_objects(1);
    client.push_metric(&delete).await.unwrap();

    let records = lister(&datastore, Granularity::Bucket)
        .list(&["demo".to_owned()], TimeRange::new(T0 - QUARTER, T0 + QUARTER))
        .await
        .unwrap();

    let record = &records[0];
    assert_eq!(record.storage_utilized, [0, 0]);
    assert_eq!(record.number_of_objects, [0, 0]);
    assert_eq!(record.operations["s3:DeleteObject"], 1);
}

/// Deltas recorded in earlier intervals are summed; absolutes resolve to
/// the nearest predecessor of each endpoint.
#[tokio::test]
async fn test_multi_interval_aggregation() {
    let datastore = Datastore::memory();

    for (offset, bytes) in [(0, 100u64), (1, 200), (2, 300)] {
        let put = MetricEvent::new(Operation::PutObject)
            .with_bucket("demo")
            .with_new_byte_length(bytes);
        client_at(&datastore, T0 + offset * QUARTER)
            .push_metric(&put)
            .await
            .unwrap();
    }

    // Only the middle interval.
    let records = lister(&datastore, Granularity::Bucket)
        .list(
            &["demo".to_owned()],
            TimeRange::new(T0 + QUARTER, T0 + 2 * QUARTER),
        )
        .await
        .unwrap();

    let record = &records[0];
    assert_eq!(record.incoming_bytes, 200);
    assert_eq!(record.operations["s3:PutObject"], 1);
    // The start absolute includes the sample written within the start
    // interval; the end absolute includes the sample at the end boundary.
    assert_eq!(record.storage_utilized, [300, 600]);

    // The full range.
    let records = lister(&datastore, Granularity::Bucket)
        .list(
            &["demo".to_owned()],
            TimeRange::new(T0 - QUARTER, T0 + 3 * QUARTER),
        )
        .await
        .unwrap();

    let record = &records[0];
    assert_eq!(record.incoming_bytes, 600);
    assert_eq!(record.operations["s3:PutObject"], 3);
    assert_eq!(record.storage_utilized, [0, 600]);
    assert_eq!(record.number_of_objects, [0, 3]);
}

/// Replaying an identical event stream doubles the deltas while the state
/// set stays idempotent per interval.
#[tokio::test]
async fn test_replay_is_additive_on_deltas() {
    let datastore = Datastore::memory();
    let client = client_at(&datastore, T0);

    for _ in 0..2 {
        let put = MetricEvent::new(Operation::PutObject)
            .with_bucket("demo")
            .with_new_byte_length(100);
        client.push_metric(&put).await.unwrap();

        let get = MetricEvent::new(Operation::GetObject)
            .with_bucket("demo")
            .with_new_byte_length(100);
        client.push_metric(&get).await.unwrap();
    }

    let records = lister(&datastore, Granularity::Bucket)
        .list(&["demo".to_owned()], TimeRange::new(T0 - QUARTER, T0 + QUARTER))
        .await
        .unwrap();

    let record = &records[0];
    assert_eq!(record.incoming_bytes, 200);
    assert_eq!(record.outgoing_bytes, 200);
    assert_eq!(record.operations["s3:PutObject"], 2);
    assert_eq!(record.operations["s3:GetObject"], 2);
    // The sampled level matches the final counter, not the sum of samples.
    assert_eq!(record.storage_utilized, [0, 200]);
    assert_eq!(record.number_of_objects, [0, 2]);
}

/// Events fan out to every level they carry; each family answers its own
/// queries.
#[tokio::test]
async fn test_fan_out_across_granularities() {
    let datastore = Datastore::memory();
    let client = client_at(&datastore, T0);

    let put = MetricEvent::new(Operation::PutObject)
        .with_bucket("demo")
        .with_account_id("014ad")
        .with_new_byte_length(512);
    client.push_metric(&put).await.unwrap();

    let range = TimeRange::new(T0 - QUARTER, T0 + QUARTER);

    let accounts = lister(&datastore, Granularity::Account)
        .list(&["014ad".to_owned()], range)
        .await
        .unwrap();
    assert_eq!(
        accounts[0].resource,
        ResourceName::Account {
            account_id: "014ad".to_owned()
        }
    );
    assert_eq!(accounts[0].storage_utilized, [0, 512]);

    let service = lister(&datastore, Granularity::Service)
        .list(&["s3".to_owned()], range)
        .await
        .unwrap();
    assert_eq!(
        service[0].resource,
        ResourceName::Service {
            service_name: "s3".to_owned()
        }
    );
    assert_eq!(service[0].operations["s3:PutObject"], 1);
}

/// The serialized record carries the wire field names.
#[test]
fn test_record_serialization_shape() {
    let datastore = Datastore::memory();
    let lister = lister(&datastore, Granularity::Bucket);

    let record = futures::executor::block_on(
        lister.list(&["demo".to_owned()], TimeRange::new(T0, T0 + QUARTER)),
    )
    .unwrap()
    .remove(0);

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["bucketName"], "demo");
    assert_eq!(value["timeRange"], serde_json::json!([T0, T0 + QUARTER]));
    assert_eq!(value["storageUtilized"], serde_json::json!([0, 0]));
    assert_eq!(value["incomingBytes"], 0);
    assert_eq!(value["outgoingBytes"], 0);
    assert_eq!(value["numberOfObjects"], serde_json::json!([0, 0]));
    assert_eq!(value["operations"]["s3:CreateBucket"], 0);
    assert_eq!(
        value["operations"].as_object().unwrap().len(),
        Operation::ALL.len()
    );
}
