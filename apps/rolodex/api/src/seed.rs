//! Demo catalog for local development.

use chrono::{Duration, SubsecRound, Utc};
use domain_items::{Item, ItemRepository};
use domain_projects::{Project, ProjectRepository};
use tracing::info;

pub const DEMO_PROJECT_ID: &str = "demo-project-1";
const DEMO_PROJECT_NAME: &str = "Signature Living Room";
const DEMO_PROJECT_ITEMS: usize = 3;

struct DemoItem {
    title: &'static str,
    vendor: &'static str,
    price: f64,
    description: &'static str,
    colour_hex: &'static str,
    category: &'static str,
    material: &'static str,
    img_url: &'static str,
}

const DEMO_ITEMS: [DemoItem; 5] = [
    DemoItem {
        title: "Modular Linen Sofa",
        vendor: "Atelier 23",
        price: 4280.0,
        description: "Three-piece modular linen sofa with relaxed silhouette and kiln-dried oak base.",
        colour_hex: "#E9E4DC",
        category: "Seating",
        material: "Linen",
        img_url: "https://images.unsplash.com/photo-1616628182504-9f3b0663d3d4",
    },
    DemoItem {
        title: "Sculptural Travertine Coffee Table",
        vendor: "Studio Roca",
        price: 2150.0,
        description: "Hand-polished travertine slab with offset plinth base and honed finish.",
        colour_hex: "#D9CAB3",
        category: "Tables",
        material: "Stone",
        img_url: "https://images.unsplash.com/photo-1582582494700-6a7f1a3fcf52",
    },
    DemoItem {
        title: "Arched Brass Floor Lamp",
        vendor: "Lumina",
        price: 890.0,
        description: "Oversized brass floor lamp with opal glass dome and dim-to-warm LED core.",
        colour_hex: "#C9A467",
        category: "Lighting",
        material: "Brass",
        img_url: "https://images.unsplash.com/photo-1505693416388-ac5ce068fe85",
    },
    DemoItem {
        title: "Walnut + Bouclé Lounge Chair",
        vendor: "Formed",
        price: 1650.0,
        description: "Curved walnut frame with upholstered bouclé cushions and inset leather straps.",
        colour_hex: "#CDB8A7",
        category: "Seating",
        material: "Walnut",
        img_url: "https://images.unsplash.com/photo-1555041469-a586c61ea9bc",
    },
    DemoItem {
        title: "Hand-Tufted Graphite Rug",
        vendor: "Pattern Society",
        price: 2290.0,
        description: "New Zealand wool rug with tonal graphite gradient and 20mm plush pile.",
        colour_hex: "#3C3C3E",
        category: "Rugs",
        material: "Wool",
        img_url: "https://images.unsplash.com/photo-1600585154340-0ef3c08ab1b7",
    },
];

fn demo_item(index: usize, demo: &DemoItem, owner_id: &str) -> Item {
    let now = Utc::now().trunc_subsecs(6);
    Item {
        id: format!("demo-item-{}", index + 1),
        owner_id: owner_id.to_string(),
        img_url: demo.img_url.to_string(),
        title: Some(demo.title.to_string()),
        vendor: Some(demo.vendor.to_string()),
        price: Some(demo.price),
        currency: Some("USD".to_string()),
        description: Some(demo.description.to_string()),
        colour_hex: Some(demo.colour_hex.to_string()),
        category: Some(demo.category.to_string()),
        material: Some(demo.material.to_string()),
        src_url: None,
        tags: None,
        notes: None,
        created_at: now - Duration::days(index as i64 + 1),
        updated_at: None,
    }
}

/// Seeds items and the demo project, each only into an empty table.
pub async fn seed_demo<I, P>(items: &I, projects: &P, owner_id: &str) -> eyre::Result<()>
where
    I: ItemRepository,
    P: ProjectRepository,
{
    if items.count().await? == 0 {
        for (index, demo) in DEMO_ITEMS.iter().enumerate() {
            items.insert(demo_item(index, demo, owner_id)).await?;
        }
        info!(owner_id = %owner_id, count = DEMO_ITEMS.len(), "Seeded demo items");
    }

    if projects.count().await? == 0 {
        let project = Project {
            id: DEMO_PROJECT_ID.to_string(),
            owner_id: owner_id.to_string(),
            name: DEMO_PROJECT_NAME.to_string(),
            budget: None,
            description: None,
            created_at: Utc::now().trunc_subsecs(6),
            updated_at: None,
        };
        projects.create(project).await?;

        let linked = items
            .get_many(
                owner_id,
                &(1..=DEMO_PROJECT_ITEMS)
                    .map(|n| format!("demo-item-{n}"))
                    .collect::<Vec<_>>(),
            )
            .await?;
        for item in &linked {
            projects.add_item(DEMO_PROJECT_ID, &item.id).await?;
        }
        info!(linked = linked.len(), "Seeded demo project");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_items::InMemoryItemRepository;
    use domain_projects::InMemoryProjectRepository;

    #[tokio::test]
    async fn seeds_items_and_project_once() {
        let items = InMemoryItemRepository::new();
        let projects = InMemoryProjectRepository::new();

        seed_demo(&items, &projects, "demo-owner").await.unwrap();
        seed_demo(&items, &projects, "demo-owner").await.unwrap();

        assert_eq!(items.count().await.unwrap(), 5);
        assert_eq!(projects.count().await.unwrap(), 1);

        let summaries = projects.list("demo-owner").await.unwrap();
        assert_eq!(summaries[0].name, "Signature Living Room");
        assert_eq!(summaries[0].item_count, 3);

        let sofa = items.get("demo-owner", "demo-item-1").await.unwrap().unwrap();
        assert_eq!(sofa.currency.as_deref(), Some("USD"));
        assert!(sofa.created_at < Utc::now());
    }

    #[tokio::test]
    async fn existing_catalog_is_left_alone() {
        let items = InMemoryItemRepository::new();
        let projects = InMemoryProjectRepository::new();
        items
            .insert(demo_item(0, &DEMO_ITEMS[0], "someone-else"))
            .await
            .unwrap();

        seed_demo(&items, &projects, "demo-owner").await.unwrap();

        assert_eq!(items.count().await.unwrap(), 1);
        let summaries = projects.list("demo-owner").await.unwrap();
        assert_eq!(summaries[0].item_count, 0);
    }
}
