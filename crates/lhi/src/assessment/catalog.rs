use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stable identifier of a questionnaire item.
pub type ItemId = u32;

/// Semantic tag used by the attachment-style classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionRole {
    Anxiety,
    Avoidance,
    Other,
}

/// Latent construct measured by a subset of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub id: String,
    pub name: String,
    pub name_cn: String,
    pub description: String,
    pub role: DimensionRole,
}

impl Dimension {
    fn new(id: &str, name: &str, name_cn: &str, description: &str, role: DimensionRole) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            name_cn: name_cn.to_string(),
            description: description.to_string(),
            role,
        }
    }
}

/// One Likert-scale statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub text: String,
    pub dimension_id: String,
    pub is_reverse: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog defines no dimensions")]
    Empty,
    #[error("duplicate dimension id '{0}'")]
    DuplicateDimension(String),
    #[error("duplicate item id {0}")]
    DuplicateItem(ItemId),
    #[error("item {item} references unknown dimension '{dimension}'")]
    UnknownDimension { item: ItemId, dimension: String },
    #[error("dimension '{0}' has no items")]
    EmptyDimension(String),
}

/// Immutable questionnaire definition the scoring engine is built against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    dimensions: Vec<Dimension>,
    items: Vec<Item>,
}

impl Catalog {
    /// Validate and build a catalog. Every dimension must own at least one item and every
    /// item must point at a known dimension.
    pub fn new(dimensions: Vec<Dimension>, items: Vec<Item>) -> Result<Self, CatalogError> {
        if dimensions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut dimension_ids = BTreeSet::new();
        for dimension in &dimensions {
            if !dimension_ids.insert(dimension.id.as_str()) {
                return Err(CatalogError::DuplicateDimension(dimension.id.clone()));
            }
        }

        let mut item_ids = BTreeSet::new();
        for item in &items {
            if !item_ids.insert(item.id) {
                return Err(CatalogError::DuplicateItem(item.id));
            }
            if !dimension_ids.contains(item.dimension_id.as_str()) {
                return Err(CatalogError::UnknownDimension {
                    item: item.id,
                    dimension: item.dimension_id.clone(),
                });
            }
        }

        if let Some(empty) = dimensions
            .iter()
            .find(|dimension| !items.iter().any(|item| item.dimension_id == dimension.id))
        {
            return Err(CatalogError::EmptyDimension(empty.id.clone()));
        }

        Ok(Self { dimensions, items })
    }

    /// The 40-item relationship health questionnaire across six dimensions.
    pub fn standard() -> Self {
        let dimensions = vec![
            Dimension::new(
                "d1",
                "Attachment Anxiety",
                "依恋焦虑",
                "Worry about partner availability and love.",
                DimensionRole::Anxiety,
            ),
            Dimension::new(
                "d2",
                "Attachment Avoidance",
                "依恋回避",
                "Discomfort with intimacy and dependency.",
                DimensionRole::Avoidance,
            ),
            Dimension::new(
                "d3",
                "Control",
                "控制欲",
                "Attempts to monitor or restrict partner.",
                DimensionRole::Other,
            ),
            Dimension::new(
                "d4",
                "Jealousy",
                "嫉妒强度",
                "Negative emotional reaction to perceived threats.",
                DimensionRole::Other,
            ),
            Dimension::new(
                "d5",
                "Emotional Dependency",
                "情感依赖",
                "Over-reliance on partner for self-worth.",
                DimensionRole::Other,
            ),
            Dimension::new(
                "d6",
                "Relationship Insecurity",
                "关系不安全感",
                "General lack of confidence in the relationship future.",
                DimensionRole::Other,
            ),
        ];

        let items = STANDARD_ITEMS
            .iter()
            .enumerate()
            .map(|(index, (dimension_id, text))| Item {
                id: index as ItemId + 1,
                text: (*text).to_string(),
                dimension_id: (*dimension_id).to_string(),
                is_reverse: false,
            })
            .collect();

        // The table above is static and covers every dimension.
        Self { dimensions, items }
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn dimension(&self, id: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|dimension| dimension.id == id)
    }

    pub fn dimension_with_role(&self, role: DimensionRole) -> Option<&Dimension> {
        self.dimensions
            .iter()
            .find(|dimension| dimension.role == role)
    }

    pub fn items_for<'a>(&'a self, dimension_id: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |item| item.dimension_id == dimension_id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

const STANDARD_ITEMS: [(&str, &str); 40] = [
    ("d1", "我担心对方没有我爱TA那么爱我"),
    ("d1", "伴侣没有及时回消息时，我会感到焦虑不安"),
    ("d1", "我需要经常得到伴侣的肯定，才能确认我们的关系还好好的"),
    ("d1", "我害怕自己会被取代，或者被对方遗忘"),
    ("d1", "我总是担心这段关系会突然结束"),
    ("d1", "看到伴侣跟别人聊得开心，我就会很不安"),
    ("d1", "因为过去的感情经历，我在恋爱中特别容易焦虑"),
    ("d2", "我不太愿意在感情中分享太多个人的内心想法"),
    ("d2", "比起完全依赖伴侣，我更习惯保持独立"),
    ("d2", "太过亲密的关系会让我觉得不自在，有压力"),
    ("d2", "我倾向于避开讨论结婚、未来规划这类话题"),
    ("d2", "向对方完全敞开心扉会让我觉得很没有安全感"),
    ("d2", "当两个人的关系越来越亲密时，我反而想要保持点距离"),
    ("d2", "我不太喜欢伴侣过分依赖我"),
    ("d3", "我会翻看伴侣的手机或查看TA的社交媒体"),
    ("d3", "我不能接受伴侣跟异性朋友单独见面"),
    ("d3", "我要求伴侣随时告诉我TA在哪里、在做什么"),
    ("d3", "如果伴侣夸奖别人（特别是异性），我会觉得需要管一管"),
    ("d3", "我会限制伴侣的社交活动，以确保TA不会变心"),
    ("d3", "我觉得伴侣做重要决定之前应该先征得我的同意"),
    ("d4", "看到伴侣跟别人互动亲密，我会非常嫉妒"),
    ("d4", "我会怀疑伴侣对我是否真的忠诚"),
    ("d4", "伴侣只要提起前任，我就会感到不舒服"),
    ("d4", "我会忍不住想象伴侣可能出轨的画面"),
    ("d4", "我会突然打电话或发消息，确认伴侣在哪里"),
    ("d4", "伴侣收到异性的消息时，我会很想看看聊的是什么"),
    ("d4", "嫉妒常常让我的情绪起伏很大"),
    ("d5", "没有伴侣，我会觉得生活很空虚"),
    ("d5", "我很难自己做决定，总是需要问问伴侣的意见"),
    ("d5", "我害怕一个人，所以会死死抓住这段关系不放"),
    ("d5", "我开不开心，完全取决于伴侣的心情"),
    ("d5", "为了让伴侣高兴，我会委屈自己、牺牲自己的需要"),
    ("d5", "只要跟伴侣分开一段时间，我就会特别想念，甚至影响正常生活"),
    ("d6", "我对这段关系能走多远没什么信心"),
    ("d6", "我很容易紧张，总担心一些小事会破坏我们的关系"),
    ("d6", "因为过去受过伤，我在恋爱中很难真正信任对方"),
    ("d6", "我的情绪经常不稳定，这也影响到了伴侣"),
    ("d6", "我觉得自己不够好，配不上被爱"),
    ("d6", "一旦关系出现问题，我就会特别慌张、不知所措"),
    ("d6", "我不相信伴侣能对我长久保持忠诚"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn dimension(id: &str) -> Dimension {
        Dimension::new(id, id, id, "", DimensionRole::Other)
    }

    fn item(id: ItemId, dimension_id: &str) -> Item {
        Item {
            id,
            text: format!("item {id}"),
            dimension_id: dimension_id.to_string(),
            is_reverse: false,
        }
    }

    #[test]
    fn standard_catalog_partitions_all_items() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.dimensions().len(), 6);
        assert_eq!(catalog.items().len(), 40);

        let rebuilt = Catalog::new(catalog.dimensions().to_vec(), catalog.items().to_vec())
            .expect("standard catalog is valid");
        assert_eq!(rebuilt, catalog);

        let counts: Vec<usize> = catalog
            .dimensions()
            .iter()
            .map(|dimension| catalog.items_for(&dimension.id).count())
            .collect();
        assert_eq!(counts, vec![7, 7, 6, 7, 6, 7]);
    }

    #[test]
    fn standard_catalog_tags_attachment_roles() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog
                .dimension_with_role(DimensionRole::Anxiety)
                .map(|d| d.id.as_str()),
            Some("d1")
        );
        assert_eq!(
            catalog
                .dimension_with_role(DimensionRole::Avoidance)
                .map(|d| d.id.as_str()),
            Some("d2")
        );
        assert_eq!(catalog.item(15).map(|i| i.dimension_id.as_str()), Some("d3"));
        assert!(catalog.item(41).is_none());
    }

    #[test]
    fn rejects_items_pointing_at_unknown_dimensions() {
        let err = Catalog::new(vec![dimension("a")], vec![item(1, "a"), item(2, "b")])
            .expect_err("unknown dimension");
        assert_eq!(
            err,
            CatalogError::UnknownDimension {
                item: 2,
                dimension: "b".to_string()
            }
        );
    }

    #[test]
    fn rejects_dimensions_without_items() {
        let err = Catalog::new(vec![dimension("a"), dimension("b")], vec![item(1, "a")])
            .expect_err("empty dimension");
        assert_eq!(err, CatalogError::EmptyDimension("b".to_string()));
    }

    #[test]
    fn rejects_empty_catalog() {
        assert_eq!(Catalog::new(Vec::new(), Vec::new()), Err(CatalogError::Empty));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Catalog::new(vec![dimension("a")], vec![item(1, "a"), item(1, "a")])
            .expect_err("duplicate item");
        assert_eq!(err, CatalogError::DuplicateItem(1));

        let err = Catalog::new(vec![dimension("a"), dimension("a")], vec![item(1, "a")])
            .expect_err("duplicate dimension");
        assert_eq!(err, CatalogError::DuplicateDimension("a".to_string()));
    }
}
