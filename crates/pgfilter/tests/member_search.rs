//! Database-backed search, paging and bulk update tests.
//!
//! Each test runs inside a transaction on a private schema and rolls back at the end.
//! Skipped when `DATABASE_URL` is not set.

use pgfilter::schema::{MEMBER_TEAM_ON, member, team};
use pgfilter::{
    DbConfig, DbResult, MemberRepository, MemberTeamDto, PageRequest, SearchCondition, connect,
};
use std::time::{SystemTime, UNIX_EPOCH};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn try_connect(test: &str) -> DbResult<Option<tokio_postgres::Client>> {
    dotenvy::dotenv().ok();
    init_tracing();
    match DbConfig::from_env() {
        Ok(config) => Ok(Some(connect(&config).await?)),
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            Ok(None)
        }
    }
}

/// Isolate the transaction in a fresh schema so concurrent tests never share tables.
async fn isolate(tx: &tokio_postgres::Transaction<'_>) -> DbResult<()> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    let schema = format!("pgfilter_test_{}_{}", std::process::id(), nanos);
    tx.batch_execute(&format!("CREATE SCHEMA {schema}; SET LOCAL search_path TO {schema}"))
        .await
        .map_err(pgfilter::DbError::from_db_error)
}

/// teamA: member1 (10), member2 (20); teamB: member3 (30), member4 (40).
async fn seed<C: pgfilter::GenericClient>(repo: &MemberRepository<'_, C>) -> DbResult<()> {
    repo.create_schema().await?;
    let team_a = repo.save_team("teamA").await?;
    let team_b = repo.save_team("teamB").await?;
    repo.save_member("member1", 10, Some(team_a.id)).await?;
    repo.save_member("member2", 20, Some(team_a.id)).await?;
    repo.save_member("member3", 30, Some(team_b.id)).await?;
    repo.save_member("member4", 40, Some(team_b.id)).await?;
    Ok(())
}

fn usernames(rows: &[MemberTeamDto]) -> Vec<&str> {
    rows.iter().map(|r| r.username.as_str()).collect()
}

#[tokio::test]
async fn search_applies_only_present_filters() -> DbResult<()> {
    let Some(mut client) = try_connect("search_applies_only_present_filters").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    isolate(&tx).await?;
    let repo = MemberRepository::new(&tx);
    seed(&repo).await?;

    let all = repo.search(&SearchCondition::new()).await?;
    assert_eq!(usernames(&all), ["member1", "member2", "member3", "member4"]);

    let cond = SearchCondition::new()
        .with_age_goe(35)
        .with_age_loe(40)
        .with_team_name("teamB");
    let rows = repo.search(&cond).await?;
    assert_eq!(usernames(&rows), ["member4"]);
    assert_eq!(rows[0].team_name.as_deref(), Some("teamB"));

    let cond = SearchCondition::new().with_username("member1").with_age_goe(10);
    assert_eq!(usernames(&repo.search(&cond).await?), ["member1"]);

    let blank = SearchCondition::new().with_username("  ").with_team_name("");
    assert_eq!(repo.search(&blank).await?.len(), 4);

    tx.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn builder_and_fold_return_same_rows() -> DbResult<()> {
    let Some(mut client) = try_connect("builder_and_fold_return_same_rows").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    isolate(&tx).await?;
    let repo = MemberRepository::new(&tx);
    seed(&repo).await?;

    let conditions = [
        SearchCondition::new(),
        SearchCondition::new().with_username("member2"),
        SearchCondition::new().with_team_name("teamA").with_age_loe(15),
        SearchCondition::new().with_age_loe(40).with_age_goe(35),
        SearchCondition::new().with_team_name("nobody"),
    ];
    for cond in &conditions {
        assert_eq!(repo.search(cond).await?, repo.search_by_builder(cond).await?, "{cond:?}");
    }

    tx.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn member_without_team_is_kept_by_left_join() -> DbResult<()> {
    let Some(mut client) = try_connect("member_without_team_is_kept_by_left_join").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    isolate(&tx).await?;
    let repo = MemberRepository::new(&tx);
    seed(&repo).await?;
    let loner = repo.save_member("member5", 50, None).await?;

    let all = repo.search(&SearchCondition::new()).await?;
    assert_eq!(all.len(), 5);
    assert_eq!(all[4].team_name, None);

    let team_b = repo.search(&SearchCondition::new().with_team_name("teamB")).await?;
    assert_eq!(usernames(&team_b), ["member3", "member4"]);

    assert_eq!(repo.find_by_id(loner.id).await?, Some(loner.clone()));
    assert_eq!(repo.find_by_username("member5").await?, vec![loner]);
    assert_eq!(repo.find_by_id(-1).await?, None);

    tx.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn paging_counts_only_when_needed() -> DbResult<()> {
    let Some(mut client) = try_connect("paging_counts_only_when_needed").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    isolate(&tx).await?;
    let repo = MemberRepository::new(&tx);
    seed(&repo).await?;

    let all = SearchCondition::new();
    let first = repo.search_page_complex(&all, PageRequest::of(0, 3)?).await?;
    assert_eq!(usernames(&first.content), ["member1", "member2", "member3"]);
    assert_eq!(first.total, 4);
    assert!(first.has_next());

    let second = repo.search_page_complex(&all, PageRequest::of(1, 3)?).await?;
    assert_eq!(usernames(&second.content), ["member4"]);
    assert_eq!(second.total, 4);
    assert!(second.is_last());

    let beyond = repo.search_page_complex(&all, PageRequest::of(5, 3)?).await?;
    assert!(beyond.is_empty());
    assert_eq!(beyond.total, 4);

    let simple = repo.search_page_simple(&all, PageRequest::of(1, 3)?).await?;
    assert_eq!(simple, second);

    let team_a = SearchCondition::new().with_team_name("teamA");
    let page = repo.search_page_simple(&team_a, PageRequest::of(0, 10)?).await?;
    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages(), 1);

    tx.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn bulk_updates_and_deletes() -> DbResult<()> {
    let Some(mut client) = try_connect("bulk_updates_and_deletes").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    isolate(&tx).await?;
    let repo = MemberRepository::new(&tx);
    seed(&repo).await?;

    assert_eq!(repo.bulk_rename_younger_than(28, "guest").await?, 2);
    assert_eq!(repo.find_by_username("guest").await?.len(), 2);

    assert_eq!(repo.bulk_add_age(1).await?, 4);
    let ages: Vec<i32> = repo.find_all().await?.iter().map(|m| m.age).collect();
    assert_eq!(ages, [11, 21, 31, 41]);

    assert_eq!(repo.bulk_delete_older_than(31).await?, 1);
    assert_eq!(repo.find_all().await?.len(), 3);

    tx.rollback().await?;
    Ok(())
}

fn ages(members: &[pgfilter::Member]) -> Vec<i32> {
    members.iter().map(|m| m.age).collect()
}

#[tokio::test]
async fn subquery_filters() -> DbResult<()> {
    let Some(mut client) = try_connect("subquery_filters").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    isolate(&tx).await?;
    let repo = MemberRepository::new(&tx);
    seed(&repo).await?;

    assert_eq!(ages(&repo.find_oldest().await?), [40]);
    assert_eq!(ages(&repo.find_at_least_average_age().await?), [30, 40]);
    assert_eq!(ages(&repo.find_with_age_in_older_than(10).await?), [20, 30, 40]);
    assert!(repo.find_with_age_in_older_than(40).await?.is_empty());

    let with_avg = repo.usernames_with_average_age().await?;
    assert_eq!(with_avg.len(), 4);
    assert_eq!(with_avg[0].username, "member1");
    assert!(with_avg.iter().all(|r| r.average_age == Some(25.0)));

    tx.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn aggregates_and_grouping() -> DbResult<()> {
    let Some(mut client) = try_connect("aggregates_and_grouping").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    isolate(&tx).await?;
    let repo = MemberRepository::new(&tx);

    repo.create_schema().await?;
    let empty = repo.age_stats().await?;
    assert_eq!(empty.member_count, 0);
    assert_eq!(empty.age_sum, None);

    seed(&repo).await?;
    repo.save_member("member5", 99, None).await?;

    let stats = repo.age_stats().await?;
    assert_eq!(stats.member_count, 5);
    assert_eq!(stats.age_sum, Some(199));
    assert_eq!(stats.age_max, Some(99));
    assert_eq!(stats.age_min, Some(10));

    let teams = repo.team_average_ages(None).await?;
    let summary: Vec<(&str, f64)> =
        teams.iter().map(|t| (t.team_name.as_str(), t.average_age)).collect();
    assert_eq!(summary, [("teamA", 15.0), ("teamB", 35.0)]);

    let older_teams = repo.team_average_ages(Some(20.0)).await?;
    assert_eq!(older_teams.len(), 1);
    assert_eq!(older_teams[0].team_name, "teamB");

    let groups = pgfilter::qb::select(member::FROM)
        .select_cols(&["t.name"])
        .inner_join(team::FROM, MEMBER_TEAM_ON)
        .group_by("t.name")
        .count(&tx)
        .await?;
    assert_eq!(groups, 2);

    tx.rollback().await?;
    Ok(())
}
