pub const CHARACTER_NAMES: [&str; 30] = [
    "Elizabeth Bennet",
    "Mr. Darcy",
    "Jane Bennet",
    "Mr. Bingley",
    "Lydia Bennet",
    "Mr. Wickham",
    "Charlotte Lucas",
    "Mr. Collins",
    "Mrs. Bennet",
    "Mr. Bennet",
    "Lady Catherine",
    "Mary Bennet",
    "Kitty Bennet",
    "Caroline Bingley",
    "Colonel Fitzwilliam",
    "Mrs. Phillips",
    "Sir William Lucas",
    "Maria Lucas",
    "Mrs. Gardiner",
    "Mr. Gardiner",
    "Georgiana Darcy",
    "Mrs. Reynolds",
    "Lady Anne de Bourgh",
    "Mrs. Hurst",
    "Mr. Hurst",
    "Captain Carter",
    "Mrs. Long",
    "Miss King",
    "Mrs. Hill",
    "John the Butler",
];

/// Quote sentences; `{target}` is replaced by the addressed character
pub const QUOTE_TEMPLATES: [&str; 25] = [
    "I must confess, {target}, your presence brings both comfort and confusion to my heart.",
    "In all my years, I have never met someone quite like {target}.",
    "The very thought of {target} fills me with indescribable emotions.",
    "My dear {target}, you cannot imagine the effect you have on those around you.",
    "If only {target} knew the truth of my feelings.",
    "There are few people whom I really love, and {target} is among them.",
    "The more I see of {target}, the more I am bewildered.",
    "I could easily forgive {target}'s pride, if they had not mortified mine.",
    "My good opinion of {target}, once lost, is lost forever.",
    "I cannot fix the hour, or the spot, or the look, or the words, which laid the foundation of my regard for {target}.",
    "To be fond of {target} is something every young person must experience.",
    "What a wonderful discovery it has been to know {target}.",
    "I dare say {target} has quite changed my perspective on many things.",
    "One cannot know what to think of {target}, so full of contradictions.",
    "I find myself thinking of {target} at the most unexpected moments.",
    "There is a stubbornness about me that never can bear to be frightened at the will of {target}.",
    "Till this moment I never knew myself, nor my feelings towards {target}.",
    "I have been used to consider {target} as one of the handsomest persons of my acquaintance.",
    "A person may be proud without being vain, and {target} certainly is.",
    "I could not have been more wretchedly blind to the true nature of {target}.",
    "It is particularly incumbent on those who never change their opinion, to be secure of judging properly at first about {target}.",
    "My feelings towards {target} are quite unlike anything I have experienced before.",
    "I am determined that nothing but the very deepest love could ever induce me to marry {target}.",
    "I have not the pleasure of understanding {target} at times.",
    "What a difference there is between {target} and what I once thought!",
];

pub const TARGET_SLOT: &str = "{target}";
