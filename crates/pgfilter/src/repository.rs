//! Member/Team data access: persistence, dynamic search, paging and bulk updates.

use crate::client::GenericClient;
use crate::condition::{CmpOp, ConditionBuilder, Predicate, SearchCondition, Term};
use crate::error::DbResult;
use crate::page::{Page, PageRequest};
use crate::qb::{self, MutationQb, SelectQb, SqlQb};
use crate::row::{AgeStats, Member, MemberAverageAge, MemberTeamDto, Team, TeamAverageAge};
use crate::schema::{self, MEMBER_TEAM_ON, member, team};

/// Repository over any [`GenericClient`]: a client, a transaction or a pooled connection.
pub struct MemberRepository<'a, C: GenericClient> {
    conn: &'a C,
}

impl<'a, C: GenericClient> MemberRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create the `team` and `member` tables if they do not exist.
    pub async fn create_schema(&self) -> DbResult<()> {
        self.conn.batch_execute(schema::CREATE_TABLES).await
    }

    pub async fn save_team(&self, name: &str) -> DbResult<Team> {
        qb::insert(team::TABLE)
            .set("name", name.to_string())
            .returning("team_id, name")
            .fetch_one(self.conn)
            .await
    }

    pub async fn save_member(
        &self,
        username: &str,
        age: i32,
        team_id: Option<i64>,
    ) -> DbResult<Member> {
        qb::insert(member::TABLE)
            .set("username", username.to_string())
            .set("age", age)
            .set("team_id", team_id)
            .returning("member_id, username, age, team_id")
            .fetch_one(self.conn)
            .await
    }

    pub async fn find_by_id(&self, id: i64) -> DbResult<Option<Member>> {
        let found = self.find_members(Term::new(member::ID, CmpOp::Eq, id)?).await?;
        Ok(found.into_iter().next())
    }

    pub async fn find_all(&self) -> DbResult<Vec<Member>> {
        qb::select(member::FROM)
            .order_by("m.member_id")
            .fetch_all(self.conn)
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> DbResult<Vec<Member>> {
        self.find_members(Term::new(member::USERNAME, CmpOp::Eq, username)?).await
    }

    /// Members whose age equals the maximum age.
    pub async fn find_oldest(&self) -> DbResult<Vec<Member>> {
        let max_age = qb::select(member::SUB_FROM).select("MAX(ms.age)");
        self.find_members(Term::subquery(member::AGE, CmpOp::Eq, max_age)?).await
    }

    /// Members at least as old as the average member.
    pub async fn find_at_least_average_age(&self) -> DbResult<Vec<Member>> {
        let avg_age = qb::select(member::SUB_FROM).select("AVG(ms.age)");
        self.find_members(Term::subquery(member::AGE, CmpOp::Gte, avg_age)?).await
    }

    /// Members whose age is one of the ages above `age`.
    pub async fn find_with_age_in_older_than(&self, age: i32) -> DbResult<Vec<Member>> {
        let ages = qb::select(member::SUB_FROM)
            .select("ms.age")
            .filter(Term::new(member::SUB_AGE, CmpOp::Gt, age)?.into());
        self.find_members(Term::in_subquery(member::AGE, ages)?).await
    }

    async fn find_members(&self, term: Term) -> DbResult<Vec<Member>> {
        qb::select(member::FROM)
            .filter(term.into())
            .order_by("m.member_id")
            .fetch_all(self.conn)
            .await
    }

    /// Count, sum, average, max and min of member ages.
    pub async fn age_stats(&self) -> DbResult<AgeStats> {
        qb::select(member::FROM)
            .select_cols(&AgeStats::COLUMNS)
            .fetch_one(self.conn)
            .await
    }

    /// Average age per team, ordered by team name. Members without a team are not counted.
    pub async fn team_average_ages(
        &self,
        min_average: Option<f64>,
    ) -> DbResult<Vec<TeamAverageAge>> {
        team_average_query(min_average).fetch_all(self.conn).await
    }

    /// Every member's username next to the overall average age, ordered by member id.
    pub async fn usernames_with_average_age(&self) -> DbResult<Vec<MemberAverageAge>> {
        let avg_age = qb::select(member::SUB_FROM).select("AVG(ms.age)::float8");
        qb::select(member::FROM)
            .select_cols(&["m.username"])
            .select_subquery(avg_age, "average_age")
            .order_by("m.member_id")
            .fetch_all(self.conn)
            .await
    }

    /// Search with a [`ConditionBuilder`] fed from each present filter.
    pub async fn search_by_builder(&self, cond: &SearchCondition) -> DbResult<Vec<MemberTeamDto>> {
        let mut builder = ConditionBuilder::new();
        builder
            .add_equals(member::USERNAME, cond.username_eq.as_deref())
            .add_equals(team::NAME, cond.team_name_eq.as_deref())
            .add_at_least(member::AGE, cond.age_goe)
            .add_at_most(member::AGE, cond.age_loe);
        tracing::debug!(
            target: "pgfilter.condition",
            terms = builder.build().len(),
            dropped = builder.dropped().len(),
            "member search (builder)"
        );
        member_team_query(builder.into_predicate())
            .fetch_all(self.conn)
            .await
    }

    /// Search with the per-field mapper fold.
    pub async fn search(&self, cond: &SearchCondition) -> DbResult<Vec<MemberTeamDto>> {
        let predicate = cond.to_predicate();
        tracing::debug!(target: "pgfilter.condition", terms = predicate.len(), "member search");
        member_team_query(predicate).fetch_all(self.conn).await
    }

    /// One page of search results; always runs the count query.
    pub async fn search_page_simple(
        &self,
        cond: &SearchCondition,
        request: PageRequest,
    ) -> DbResult<Page<MemberTeamDto>> {
        let query = member_team_query(cond.to_predicate());
        let content = query.clone().paginate(request).fetch_all(self.conn).await?;
        let total = query.count(self.conn).await?;
        Ok(Page::new(content, request, total))
    }

    /// One page of search results; the count query runs only when the total is not
    /// derivable from the page itself.
    pub async fn search_page_complex(
        &self,
        cond: &SearchCondition,
        request: PageRequest,
    ) -> DbResult<Page<MemberTeamDto>> {
        let query = member_team_query(cond.to_predicate());
        let content = query.clone().paginate(request).fetch_all(self.conn).await?;
        Page::with_lazy_total(content, request, || query.count(self.conn)).await
    }

    /// Rename every member younger than `age`. Returns the number of rows updated.
    pub async fn bulk_rename_younger_than(&self, age: i32, username: &str) -> DbResult<u64> {
        let filter = Predicate::from_term(Term::new(member::AGE, CmpOp::Lt, age)?);
        qb::update(member::FROM)
            .set("username", username.to_string())
            .filter(filter)
            .execute(self.conn)
            .await
    }

    /// Add `delta` to every member's age.
    pub async fn bulk_add_age(&self, delta: i32) -> DbResult<u64> {
        qb::update(member::FROM)
            .set_raw("age", &format!("m.age + {delta}"))
            .execute(self.conn)
            .await
    }

    /// Delete every member older than `age`.
    pub async fn bulk_delete_older_than(&self, age: i32) -> DbResult<u64> {
        let filter = Predicate::from_term(Term::new(member::AGE, CmpOp::Gt, age)?);
        qb::delete(member::FROM).filter(filter).execute(self.conn).await
    }
}

fn team_average_query(min_average: Option<f64>) -> SelectQb {
    let query = qb::select(member::FROM)
        .select_cols(&TeamAverageAge::COLUMNS)
        .inner_join(team::FROM, MEMBER_TEAM_ON)
        .group_by("t.name")
        .order_by("t.name");
    match min_average {
        Some(min) => query.having_gte(TeamAverageAge::AVERAGE_AGE, min),
        None => query,
    }
}

/// Members left-joined with their team, projected as [`MemberTeamDto`], ordered by member id.
fn member_team_query(filter: Predicate) -> SelectQb {
    qb::select(member::FROM)
        .select_cols(&MemberTeamDto::COLUMNS)
        .left_join(team::FROM, MEMBER_TEAM_ON)
        .filter(filter)
        .order_by("m.member_id")
}
