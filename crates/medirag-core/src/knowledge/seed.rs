//! Built-in healthcare dataset loaded into an empty knowledge base.

use medirag_types::knowledge::{Category, NewDocument};

pub const SEED_SOURCE: &str = "comprehensive_dataset";
pub const SEED_TAGS: [&str; 3] = ["healthcare", "medical", "wellness"];

const SEED_DOCUMENTS: [(&str, Category, &str); 12] = [
    (
        "Hypertension Management",
        Category::MedicalCondition,
        "Hypertension, or high blood pressure, is a long-term condition in which the force of blood against artery walls stays elevated. It rarely causes symptoms, which is why it is often called a silent disease, yet it is one of the leading risk factors for cardiovascular disease worldwide.

A diagnosis is usually made when repeated readings stay at or above 140/90 mmHg. Risk rises with age, family history, excess weight, inactivity, a salty diet, heavy drinking and smoking.

Hypertension management starts with lifestyle changes. Regular aerobic exercise, weight loss, limiting salt, eating plenty of vegetables and managing stress can all lower blood pressure. When lifestyle changes are not enough, a clinician may prescribe antihypertensive medication.

Home blood pressure monitoring helps track progress between visits. Keeping blood pressure under control lowers the risk of heart attack, stroke and kidney damage.",
    ),
    (
        "Diabetes Prevention and Management",
        Category::MedicalCondition,
        "Diabetes is a metabolic disease in which blood sugar stays too high because the body does not make or respond to insulin properly. Type 2 diabetes is the most common form and develops gradually over years.

Diabetes prevention focuses on the same habits that protect the heart. Keeping a healthy weight, staying physically active, choosing whole grains, fruit and vegetables, and avoiding tobacco all lower the risk. People with a family history or prediabetes benefit from regular screening.

Management combines blood sugar monitoring, medication taken as prescribed, meal planning and exercise. A care team can help set glucose targets and adjust treatment over time.

Poorly controlled diabetes can damage the heart, kidneys, nerves and eyes. Routine check-ups, foot care and eye exams catch complications early.",
    ),
    (
        "Common Cold Treatment and Management",
        Category::Treatment,
        "The common cold is a mild viral respiratory infection of the nose and throat, most often caused by rhinoviruses. Adults catch a few colds each year and young children catch more.

Typical symptoms include a runny or stuffy nose, sore throat, sneezing, mild cough and tiredness. Most colds clear up on their own within seven to ten days.

Treatment is aimed at comfort. Rest, warm fluids, saline nasal sprays and throat lozenges ease symptoms, and over-the-counter pain relievers can reduce aches. Antibiotics do not work against cold viruses.

Frequent hand washing and avoiding close contact with sick people reduce the spread of infection. See a doctor if symptoms last more than ten days, a high fever develops or breathing becomes difficult.",
    ),
    (
        "Seasonal Influenza Management",
        Category::Treatment,
        "Influenza is a contagious respiratory infection caused by flu viruses. Compared with a cold it usually starts suddenly and feels more severe, with fever, chills, muscle aches, headache and exhaustion.

Most healthy people recover at home with rest, fluids and fever reducers. Antiviral medication can shorten the illness when started within about two days of the first symptoms, and it is especially useful for people at high risk.

Older adults, young children, pregnant women and people with chronic illness are more likely to develop complications such as pneumonia. They should contact a clinician early.

An annual flu vaccine is the best protection. Covering coughs, washing hands and staying home while sick help protect others.",
    ),
    (
        "Seasonal Allergies and Hay Fever",
        Category::MedicalCondition,
        "Seasonal allergies, also called hay fever or allergic rhinitis, happen when the immune system overreacts to airborne pollen from trees, grasses or weeds.

Common symptoms are sneezing, an itchy or runny nose, watery eyes and nasal congestion. Symptoms follow pollen seasons and can disturb sleep and concentration.

Treatment options include antihistamines, steroid nasal sprays and decongestants for short periods. Allergy shots can reduce sensitivity over the long term.

Checking pollen forecasts, keeping windows closed on high-pollen days and showering after time outdoors reduce exposure.",
    ),
    (
        "Gastroenteritis and Food Poisoning",
        Category::MedicalCondition,
        "Gastroenteritis is inflammation of the stomach and intestines, usually caused by viruses such as norovirus or by bacteria in contaminated food or water.

It causes diarrhea, nausea, vomiting, stomach cramps and sometimes fever. Most cases settle within a few days.

The main treatment is preventing dehydration. Small, frequent sips of water or oral rehydration solution work best, followed by bland food as appetite returns.

Seek care for signs of dehydration, blood in the stool, a high fever or symptoms lasting more than three days. Careful hand washing and safe food handling prevent most cases.",
    ),
    (
        "Urinary Tract Infections",
        Category::MedicalCondition,
        "A urinary tract infection occurs when bacteria enter the urinary system, most often the bladder. Women are affected more often than men.

Symptoms include a burning feeling when urinating, a frequent or urgent need to urinate, cloudy or strong-smelling urine and lower abdominal discomfort. Fever or back pain can mean the infection has reached the kidneys.

Most infections need antibiotics prescribed by a clinician, and the full course should be finished. Drinking plenty of water helps flush bacteria.

Staying hydrated and urinating after intercourse reduce the chance of recurrence.",
    ),
    (
        "Skin Conditions and Dermatitis",
        Category::MedicalCondition,
        "Dermatitis is a general term for skin inflammation. Eczema, contact dermatitis and seborrheic dermatitis are the most common types.

Affected skin is often red, itchy, dry or flaky, and scratching can lead to infection.

Daily moisturizing, gentle fragrance-free cleansers and avoiding known triggers form the basis of care. A clinician may recommend topical steroid creams for flare-ups.

See a doctor if a rash spreads quickly, becomes painful or shows signs of infection such as pus or warmth.",
    ),
    (
        "Headaches and Migraines",
        Category::MedicalCondition,
        "Headaches are among the most common health complaints. Tension headaches cause a dull band of pressure, while migraines bring throbbing pain, often on one side, with nausea and sensitivity to light and sound.

Common triggers include stress, poor sleep, dehydration, skipped meals, alcohol and screen strain.

Rest in a dark quiet room, fluids and over-the-counter pain relief help many headaches. People with frequent migraines may benefit from prescription treatment and a headache diary to identify triggers.

A sudden severe headache, a headache with fever and stiff neck, or one following a head injury needs urgent medical attention.",
    ),
    (
        "Back Pain and Musculoskeletal Issues",
        Category::MedicalCondition,
        "Lower back pain is one of the most frequent reasons for missed work. It is usually caused by muscle strain, poor posture or lifting with a bent back.

Most back pain improves within a few weeks. Staying gently active is better than bed rest, and heat, cold packs and pain relievers can ease discomfort.

Core strengthening, stretching and good workstation setup help prevent recurrence. Physical therapy is useful for pain that keeps returning.

Numbness in the legs, loss of bladder or bowel control or pain after a fall need prompt medical evaluation.",
    ),
    (
        "Mental Health and Wellness",
        Category::Wellness,
        "Mental health shapes how we think, feel and cope with stress. Anxiety and depression are common, treatable conditions.

Regular exercise, enough sleep, balanced meals and time with supportive people all protect mental wellness. Mindfulness and breathing exercises can calm stress in the moment.

Talking to a counselor, therapist or doctor is a sign of strength. Therapy and, when needed, medication help many people recover.

If you have thoughts of harming yourself, contact a crisis line or emergency services right away.",
    ),
    (
        "Nutrition and Preventive Care",
        Category::Prevention,
        "Good nutrition is one of the strongest tools for disease prevention. A diet built on vegetables, fruit, whole grains, lean protein and healthy fats supports heart health and a healthy weight.

Limiting processed food, added sugar and salt lowers the risk of high blood pressure and diabetes. Drinking water instead of sugary drinks helps too.

Preventive care also means regular checkups, recommended screenings and staying up to date on vaccines. Screening finds problems such as high cholesterol or cancer early, when treatment works best.

Adults should aim for at least 150 minutes of moderate activity each week along with muscle-strengthening exercise.",
    ),
];

/// The built-in documents as [`NewDocument`] inputs.
pub fn healthcare_documents() -> Vec<NewDocument> {
    SEED_DOCUMENTS
        .iter()
        .map(|(title, category, content)| NewDocument {
            title: (*title).to_string(),
            content: (*content).to_string(),
            category: *category,
            source: SEED_SOURCE.to_string(),
            tags: SEED_TAGS.iter().map(|t| (*t).to_string()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthcare_documents() {
        let docs = healthcare_documents();
        assert_eq!(docs.len(), 12);
        assert!(docs.iter().all(|d| d.source == SEED_SOURCE && d.tags.len() == 3));
        assert_eq!(
            docs.iter().filter(|d| d.category == Category::Treatment).count(),
            2
        );
        assert!(docs.iter().all(|d| d.content.contains("\n\n")));
    }
}
