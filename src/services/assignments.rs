use std::collections::BTreeSet;

use sqlx::PgPool;

use crate::repositories;

/// Replaces the quiz's assignee set. Unknown and repeated ids are dropped;
/// returns the ids that ended up assigned.
pub(crate) async fn replace_assignments(
    pool: &PgPool,
    quiz_id: &str,
    student_ids: &[String],
) -> Result<Vec<String>, sqlx::Error> {
    let requested = dedupe_ids(student_ids);

    let mut tx = pool.begin().await?;
    let known = repositories::students::existing_ids(&mut *tx, &requested).await?;
    let removed = repositories::assignments::delete_for_quiz(&mut *tx, quiz_id).await?;
    repositories::assignments::insert_many(&mut *tx, quiz_id, &known).await?;
    tx.commit().await?;

    tracing::info!(
        quiz_id,
        requested = student_ids.len(),
        assigned = known.len(),
        removed,
        "Quiz assignments replaced"
    );

    Ok(known)
}

fn dedupe_ids(ids: &[String]) -> Vec<String> {
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
